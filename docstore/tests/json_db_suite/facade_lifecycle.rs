// FICHIER : docstore/tests/json_db_suite/facade_lifecycle.rs

use crate::init_test_env;
use docstore::client::QueryOptions;
use docstore::utils::prelude::*;

fn opts(v: Value) -> QueryOptions {
    QueryOptions::from_value(v).expect("options valides")
}

#[tokio::test]
async fn test_create_then_find_unique_returns_caller_fields() {
    let env = init_test_env().await;
    let users = env.db.collection("User");

    let fields = json!({
        "userId": "U1",
        "name": "Ana",
        "languages": ["fr", "en"],
        "profile": { "city": "Lyon", "level": 3 }
    });
    let created = users.create(opts(json!({ "data": fields.clone() }))).await.unwrap();
    assert!(created.id().is_some());

    let found = users
        .find_unique(opts(json!({ "where": { "userId": "U1" } })))
        .await
        .unwrap()
        .expect("User U1 doit exister");

    for (k, v) in fields.as_object().unwrap() {
        assert_eq!(found.get(k), Some(v), "champ {} altéré", k);
    }
    assert_eq!(found.id(), created.id());
    assert!(found.date("createdAt").is_some());
    assert!(found.date("updatedAt").is_some());
}

#[tokio::test]
async fn test_student_push_vocabulary_scenario() {
    let env = init_test_env().await;
    env.db
        .collection("User")
        .create(opts(json!({ "data": { "userId": "U1" } })))
        .await
        .unwrap();

    let students = env.db.collection("Student");
    students
        .create(opts(json!({ "data": { "userId": "U1", "lvocabuIDs": [] } })))
        .await
        .unwrap();

    students
        .update(opts(json!({
            "where": { "userId": "U1" },
            "data": { "lvocabuIDs": { "push": "V1" } }
        })))
        .await
        .unwrap();

    let student = students
        .find_unique(opts(json!({ "where": { "userId": "U1" } })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student["lvocabuIDs"], json!(["V1"]));
}

#[tokio::test]
async fn test_update_merges_and_refreshes_updated_at() {
    let env = init_test_env().await;
    let coupons = env.db.collection("Coupon");
    let created = coupons
        .create(opts(json!({
            "data": {
                "couponId": "ABCD1234",
                "used": false,
                "uses": 0,
                "updatedAt": "2000-01-01T00:00:00.000Z"
            }
        })))
        .await
        .unwrap();

    let updated = coupons
        .update(opts(json!({
            "where": { "couponId": "ABCD1234" },
            "data": { "used": true, "uses": { "increment": 1 } }
        })))
        .await
        .unwrap();

    assert_eq!(updated["couponId"], "ABCD1234");
    assert_eq!(updated["used"], true);
    assert_eq!(updated["uses"], 1);
    assert_eq!(updated.get("createdAt"), created.get("createdAt"));
    assert!(updated.date("updatedAt").unwrap() > created.date("updatedAt").unwrap());
}

#[tokio::test]
async fn test_delete_removes_document_and_missing_target_is_not_found() {
    let env = init_test_env().await;
    let words = env.db.collection("Word");
    for w in ["apple", "pear"] {
        words
            .create(opts(json!({ "data": { "word": w } })))
            .await
            .unwrap();
    }

    let removed = words
        .delete(opts(json!({ "where": { "word": "apple" } })))
        .await
        .unwrap();
    assert_eq!(removed["word"], "apple");
    assert_eq!(words.count(QueryOptions::new()).await.unwrap(), 1);

    let err = words
        .delete(opts(json!({ "where": { "word": "apple" } })))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));

    let err = words
        .update(opts(json!({ "where": { "word": "kiwi" }, "data": { "word": "x" } })))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_dates_are_returned_in_canonical_form() {
    let env = init_test_env().await;
    let users = env.db.collection("User");
    users
        .create(opts(json!({
            "data": {
                "userId": "U7",
                "birthday": "1999-12-31",
                "period": "2024-06-01T08:00:00+02:00"
            }
        })))
        .await
        .unwrap();

    let user = users
        .find_unique(opts(json!({ "where": { "userId": "U7" } })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user["birthday"], "1999-12-31T00:00:00.000Z");
    assert_eq!(user["period"], "2024-06-01T06:00:00.000Z");
    assert_eq!(user.date("birthday").unwrap().to_rfc3339(), "1999-12-31T00:00:00+00:00");
}

#[tokio::test]
async fn test_has_count_and_belongs_to_through_facade() {
    let env = init_test_env().await;
    let vocab = env
        .db
        .collection("Vocabulary")
        .create(opts(json!({ "data": { "vocabularyId": "V1", "name": "Food" } })))
        .await
        .unwrap();
    let words = env.db.collection("Word");
    for w in ["apple", "bread", "cheese"] {
        words
            .create(opts(json!({ "data": { "word": w, "vocabularyId": vocab.id() } })))
            .await
            .unwrap();
    }
    // Référence par clé naturelle : ne doit pas compter
    words
        .create(opts(json!({ "data": { "word": "noise", "vocabularyId": "V1" } })))
        .await
        .unwrap();

    let found = env
        .db
        .collection("Vocabulary")
        .find_many(opts(json!({
            "where": { "vocabularyId": "V1" },
            "include": { "_count": { "select": { "words": true } } }
        })))
        .await
        .unwrap();
    assert_eq!(found[0]["_count"]["words"], 3);
}

#[tokio::test]
async fn test_update_rejects_id_and_created_at() {
    let env = init_test_env().await;
    let users = env.db.collection("User");
    let a = users
        .create(opts(json!({ "data": { "userId": "A" } })))
        .await
        .unwrap();
    let b = users
        .create(opts(json!({ "data": { "userId": "B" } })))
        .await
        .unwrap();

    for data in [json!({ "id": a.id() }), json!({ "createdAt": "2000-01-01T00:00:00.000Z" })] {
        let err = users
            .update(opts(json!({ "where": { "userId": "B" }, "data": data })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{:?}", err);
    }

    let still_b = users
        .find_unique(opts(json!({ "where": { "userId": "B" } })))
        .await
        .unwrap()
        .expect("User B doit exister");
    assert_eq!(still_b.id(), b.id());
    assert_eq!(still_b.get("createdAt"), b.get("createdAt"));
    assert_ne!(still_b.id(), a.id());
}
