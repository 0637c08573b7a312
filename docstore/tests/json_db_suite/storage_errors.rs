// FICHIER : docstore/tests/json_db_suite/storage_errors.rs

use crate::init_test_env;
use docstore::client::QueryOptions;
use docstore::utils::prelude::*;

#[tokio::test]
async fn test_corrupt_file_surfaces_storage_unavailable() {
    let env = init_test_env().await;
    env.write_raw("User", "[{\"id\": \"x\", ").await;

    let users = env.db.collection("User");
    let err = users.find_many(QueryOptions::new()).await.unwrap_err();
    assert!(matches!(err, AppError::StorageUnavailable { .. }));

    // Une écriture ne doit pas écraser le fichier illisible
    let err = users
        .create(QueryOptions::new().data(json!({ "userId": "U1" })))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::StorageUnavailable { .. }));
    let content = tokio::fs::read_to_string(env.cfg.collection_path("User").unwrap())
        .await
        .unwrap();
    assert_eq!(content, "[{\"id\": \"x\", ");
}

#[tokio::test]
async fn test_missing_collection_reads_as_empty() {
    let env = init_test_env().await;
    let coupons = env.db.collection("Coupon");
    assert!(coupons.find_many(QueryOptions::new()).await.unwrap().is_empty());
    assert_eq!(coupons.count(QueryOptions::new()).await.unwrap(), 0);
    assert!(coupons
        .find_unique(QueryOptions::new().filter(json!({ "couponId": "X" })))
        .await
        .unwrap()
        .is_none());
    assert!(!env.cfg.collection_path("Coupon").unwrap().exists());
}

#[tokio::test]
async fn test_invalid_collection_name_rejected() {
    let env = init_test_env().await;
    let err = env
        .db
        .collection("../escape")
        .find_many(QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_lose_no_update() {
    let env = init_test_env().await;
    let mut handles = Vec::new();
    for i in 0..40 {
        let words = env.db.collection("Word");
        handles.push(tokio::spawn(async move {
            words
                .create(QueryOptions::new().data(json!({ "word": format!("w{}", i) })))
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let words = env.db.collection("Word");
    assert_eq!(words.count(QueryOptions::new()).await.unwrap(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increments_are_serialized() {
    let env = init_test_env().await;
    let coupons = env.db.collection("Coupon");
    coupons
        .create(QueryOptions::new().data(json!({ "couponId": "C1", "uses": 0 })))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..25 {
        let coupons = coupons.clone();
        handles.push(tokio::spawn(async move {
            coupons
                .update(
                    QueryOptions::new()
                        .filter(json!({ "couponId": "C1" }))
                        .data(json!({ "uses": { "increment": 1 } })),
                )
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let coupon = coupons
        .find_unique(QueryOptions::new().filter(json!({ "couponId": "C1" })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(coupon["uses"], 25);
}
