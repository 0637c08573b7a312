// FICHIER : docstore/tests/json_db_suite/legacy_shapes.rs

use crate::init_test_env;
use docstore::client::QueryOptions;
use docstore::json_db::migrations::flatten_collection;
use docstore::utils::prelude::*;

fn opts(v: Value) -> QueryOptions {
    QueryOptions::from_value(v).expect("options valides")
}

#[tokio::test]
async fn test_legacy_envelope_is_flattened_on_read() {
    let env = init_test_env().await;
    env.write_raw(
        "User",
        r#"[{"id":"x","createdAt":"t","data":{"userId":"U2","name":"A"}}]"#,
    )
    .await;

    let user = env
        .db
        .collection("User")
        .find_unique(opts(json!({ "where": { "userId": "U2" } })))
        .await
        .unwrap()
        .expect("le document hérité doit être trouvé");

    // "t" n'est pas une date lisible : laissé tel quel
    assert_eq!(
        Value::from(user),
        json!({ "id": "x", "createdAt": "t", "userId": "U2", "name": "A" })
    );
}

#[tokio::test]
async fn test_legacy_envelope_with_top_level_natural_key_is_flattened() {
    let env = init_test_env().await;
    env.write_raw(
        "User",
        r#"[{"id":"x","createdAt":"t","userId":"U2","data":{"name":"A"}}]"#,
    )
    .await;

    let user = env
        .db
        .collection("User")
        .find_unique(opts(json!({ "where": { "userId": "U2", "name": "A" } })))
        .await
        .unwrap()
        .expect("le document hérité doit être trouvé");
    assert_eq!(
        Value::from(user),
        json!({ "id": "x", "createdAt": "t", "userId": "U2", "name": "A" })
    );
}

#[tokio::test]
async fn test_resaved_legacy_document_becomes_flat() {
    let env = init_test_env().await;
    env.write_raw(
        "Student",
        r#"[{"id":"s1","createdAt":"2023-01-01T00:00:00.000Z",
            "data":{"userId":"U1","lvocabuIDs":[]}}]"#,
    )
    .await;

    env.db
        .collection("Student")
        .update(opts(json!({
            "where": { "userId": "U1" },
            "data": { "lvocabuIDs": { "push": ["V1", "V2"] } }
        })))
        .await
        .unwrap();

    let raw = env.storage.load_raw("Student").await.unwrap();
    assert!(!raw[0].contains_key("data"));
    assert_eq!(raw[0]["lvocabuIDs"], json!(["V1", "V2"]));
    assert_eq!(raw[0]["id"], "s1");
}

#[tokio::test]
async fn test_has_count_includes_legacy_nested_references() {
    let env = init_test_env().await;
    env.write_raw(
        "Vocabulary",
        r#"[{"id":"voc-1","vocabularyId":"V1","name":"Food"}]"#,
    )
    .await;
    env.write_raw(
        "Word",
        r#"[
            {"id":"w1","vocabularyId":"voc-1","word":"apple"},
            {"id":"w2","data":{"vocabularyId":"voc-1","word":"bread"}},
            {"id":"w3","createdAt":"2020-01-01","data":{"vocabularyId":"voc-1","word":"cheese"}},
            {"id":"w4","data":{"vocabularyId":"voc-2","word":"map"}}
        ]"#,
    )
    .await;

    let vocab = env
        .db
        .collection("Vocabulary")
        .find_unique(opts(json!({
            "where": { "vocabularyId": "V1" },
            "include": { "_count": { "select": { "words": true } }, "words": true }
        })))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(vocab["_count"]["words"], 3);
    let words: Vec<&str> = vocab["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["word"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["apple", "bread", "cheese"]);
}

#[tokio::test]
async fn test_flatten_migration_is_idempotent() {
    let env = init_test_env().await;
    env.write_raw(
        "Coupon",
        r#"[
            {"id":"c1","data":{"couponId":"AAAA"}},
            {"id":"c2","couponId":"BBBB","label":"promo","data":{"note":"kept"}},
            {"id":"c3","couponId":"CCCC","data":{"note":"legacy"}}
        ]"#,
    )
    .await;

    assert_eq!(flatten_collection(&env.storage, "Coupon").await.unwrap(), 2);
    let first = env.storage.load_raw("Coupon").await.unwrap();
    assert_eq!(flatten_collection(&env.storage, "Coupon").await.unwrap(), 0);
    let second = env.storage.load_raw("Coupon").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0]["couponId"], "AAAA");
    // Document plat portant un champ applicatif `data` : intact
    assert_eq!(first[1]["data"], json!({ "note": "kept" }));
    // Clé naturelle au premier niveau : enveloppe aplatie
    assert_eq!(first[2]["note"], "legacy");
    assert!(!first[2].contains_key("data"));
}
