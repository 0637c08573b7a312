// FICHIER : docstore/tests/json_db_suite/query_filters.rs

use crate::{init_test_env, TestEnv};
use docstore::client::QueryOptions;
use docstore::utils::prelude::*;

fn opts(v: Value) -> QueryOptions {
    QueryOptions::from_value(v).expect("options valides")
}

async fn seed_users(env: &TestEnv) {
    let users = env.db.collection("User");
    let rows = [
        json!({ "userId": "U1", "name": "Ana", "language": "English", "tags": ["admin", "beta"] }),
        json!({ "userId": "U2", "name": "Bob", "language": "French", "tags": ["beta"] }),
        json!({ "userId": "U3", "name": "Cy", "language": "english (UK)", "tags": [] }),
        json!({ "userId": "U4", "name": "Dee", "language": "German" }),
        json!({ "userId": "U5", "name": "Eve", "language": "Spanish", "tags": ["admin"] }),
    ];
    for row in rows {
        users.create(opts(json!({ "data": row }))).await.unwrap();
    }
}

async fn user_ids(env: &TestEnv, filter: Value) -> Vec<String> {
    env.db
        .collection("User")
        .find_many(opts(json!({ "where": filter })))
        .await
        .unwrap()
        .iter()
        .map(|d| d.get_str("userId").unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_filter_operators_return_exact_subsets() {
    let env = init_test_env().await;
    seed_users(&env).await;

    assert_eq!(user_ids(&env, json!({ "name": "Bob" })).await, vec!["U2"]);
    assert_eq!(
        user_ids(&env, json!({ "language": { "contains": "ENG" } })).await,
        vec!["U1", "U3"]
    );
    assert_eq!(
        user_ids(&env, json!({ "userId": { "in": ["U1", "U4", "U5"] } })).await,
        vec!["U1", "U4", "U5"]
    );
    assert_eq!(
        user_ids(&env, json!({ "tags": { "has": "admin" } })).await,
        vec!["U1", "U5"]
    );
    assert_eq!(
        user_ids(&env, json!({ "name": { "not": "Ana" } })).await,
        vec!["U2", "U3", "U4", "U5"]
    );
    assert_eq!(
        user_ids(
            &env,
            json!({ "tags": { "has": "beta" }, "language": { "contains": "eng" } })
        )
        .await,
        vec!["U1"]
    );
    assert_eq!(
        user_ids(&env, json!({ "OR": [{ "name": "Cy" }, { "name": "Dee" }] })).await,
        vec!["U3", "U4"]
    );
}

#[tokio::test]
async fn test_vocabulary_contains_scenario() {
    let env = init_test_env().await;
    let vocab = env.db.collection("Vocabulary");
    for name in ["Food", "Travel"] {
        vocab
            .create(opts(json!({ "data": { "name": name } })))
            .await
            .unwrap();
    }

    let hits = vocab
        .find_many(opts(json!({ "where": { "name": { "contains": "foo" } } })))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Food");
}

#[tokio::test]
async fn test_unsupported_operator_is_reported() {
    let env = init_test_env().await;
    seed_users(&env).await;

    let err = env
        .db
        .collection("User")
        .find_many(opts(json!({ "where": { "name": { "search": "Ana" } } })))
        .await
        .unwrap_err();
    match err {
        AppError::UnsupportedFilter { field, operator } => {
            assert_eq!(field, "name");
            assert_eq!(operator, "search");
        }
        other => panic!("UnsupportedFilter attendu, reçu {:?}", other),
    }
}

#[tokio::test]
async fn test_sort_then_paginate_for_various_sizes() {
    for size in [0usize, 1, 50] {
        let env = init_test_env().await;
        let words = env.db.collection("Word");
        // Insertion en ordre inverse pour que le tri ait du travail
        for i in (0..size).rev() {
            words
                .create(opts(json!({ "data": { "rank": i, "word": format!("w{:02}", i) } })))
                .await
                .unwrap();
        }

        let all = words
            .find_many(opts(json!({ "orderBy": { "rank": "asc" } })))
            .await
            .unwrap();
        let ranks: Vec<u64> = all.iter().map(|d| d["rank"].as_u64().unwrap()).collect();
        assert_eq!(ranks, (0..size as u64).collect::<Vec<_>>());

        let page = words
            .find_many(opts(json!({ "orderBy": { "rank": "desc" }, "skip": 1, "take": 10 })))
            .await
            .unwrap();
        let expected: Vec<u64> = (0..size as u64).rev().skip(1).take(10).collect();
        let got: Vec<u64> = page.iter().map(|d| d["rank"].as_u64().unwrap()).collect();
        assert_eq!(got, expected, "taille {}", size);

        let projected = words
            .find_many(opts(json!({
                "select": { "word": true },
                "orderBy": [{ "word": "asc" }],
                "take": 1
            })))
            .await
            .unwrap();
        match size {
            0 => assert!(projected.is_empty()),
            _ => assert_eq!(Value::from(projected[0].clone()), json!({ "word": "w00" })),
        }
    }
}

#[tokio::test]
async fn test_count_matches_filter() {
    let env = init_test_env().await;
    seed_users(&env).await;
    let users = env.db.collection("User");
    assert_eq!(users.count(QueryOptions::new()).await.unwrap(), 5);
    assert_eq!(
        users
            .count(opts(json!({ "where": { "tags": { "has": "beta" } } })))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_sort_on_mixed_type_field_groups_by_type() {
    let env = init_test_env().await;
    let words = env.db.collection("Word");
    for i in 0..200u64 {
        let rank = match i % 3 {
            0 => json!((i * 7919) % 1000),
            1 => json!(format!("r{}", (i * 104729) % 1000)),
            _ => Value::Null,
        };
        words
            .create(opts(json!({ "data": { "word": format!("w{}", i), "rank": rank } })))
            .await
            .unwrap();
    }

    let sorted = words
        .find_many(opts(json!({ "orderBy": { "rank": "asc" } })))
        .await
        .unwrap();
    assert_eq!(sorted.len(), 200);

    let nulls = sorted.iter().take_while(|d| d["rank"].is_null()).count();
    let numbers: Vec<u64> = sorted[nulls..]
        .iter()
        .map_while(|d| d["rank"].as_u64())
        .collect();
    let strings: Vec<&str> = sorted[nulls + numbers.len()..]
        .iter()
        .map(|d| d["rank"].as_str().expect("chaînes en dernier"))
        .collect();

    assert_eq!(nulls + numbers.len() + strings.len(), 200);
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    assert!(strings.windows(2).all(|w| w[0] <= w[1]));

    let desc = words
        .find_many(opts(json!({ "orderBy": { "rank": "desc" }, "take": 1 })))
        .await
        .unwrap();
    assert_eq!(desc[0]["rank"].as_str(), strings.last().copied());
}

#[tokio::test]
async fn test_dotted_select_keeps_each_nested_value() {
    let env = init_test_env().await;
    let users = env.db.collection("User");
    users
        .create(opts(json!({
            "data": {
                "userId": "U1",
                "home": { "city": "Lyon", "zip": "69001" },
                "work": { "city": "Paris" }
            }
        })))
        .await
        .unwrap();

    let found = users
        .find_unique(opts(json!({
            "where": { "userId": "U1" },
            "select": { "home.city": true, "work.city": true }
        })))
        .await
        .unwrap()
        .expect("User U1 doit exister");
    assert_eq!(
        Value::from(found),
        json!({ "home": { "city": "Lyon" }, "work": { "city": "Paris" } })
    );
}
