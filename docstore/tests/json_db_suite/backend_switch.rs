// FICHIER : docstore/tests/json_db_suite/backend_switch.rs

use crate::init_test_env;
use async_trait::async_trait;
use docstore::catalog::Catalog;
use docstore::client::{DbClient, DocumentBackend, LocalBackend, QueryOptions};
use docstore::json_db::collections::Document;
use docstore::json_db::ids::KeyPolicy;
use docstore::json_db::migrations::copy_all;
use docstore::utils::config::{AppConfig, BackendMode};
use docstore::utils::prelude::*;
use std::sync::{Arc, Mutex};

/// Client distant factice : enregistre les appels, ne stocke rien.
#[derive(Default)]
struct RecordingRemote {
    calls: Mutex<Vec<(String, String, QueryOptions)>>,
}

impl RecordingRemote {
    fn record(&self, op: &str, collection: &str, options: QueryOptions) {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), collection.to_string(), options));
    }

    fn ops(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
    }
}

#[async_trait]
impl DocumentBackend for RecordingRemote {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn create(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        let data = options.data.clone().unwrap_or_else(|| json!({}));
        self.record("create", collection, options);
        Document::from_value(data)
    }

    async fn find_unique(
        &self,
        collection: &str,
        options: QueryOptions,
    ) -> Result<Option<Document>> {
        self.record("findUnique", collection, options);
        Ok(None)
    }

    async fn find_many(&self, collection: &str, options: QueryOptions) -> Result<Vec<Document>> {
        self.record("findMany", collection, options);
        Ok(Vec::new())
    }

    async fn count(&self, collection: &str, options: QueryOptions) -> Result<usize> {
        self.record("count", collection, options);
        Ok(42)
    }

    async fn update(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        self.record("update", collection, options);
        Err(AppError::Backend("lecture seule".to_string()))
    }

    async fn delete(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        let key = options.filter.clone().unwrap_or(Value::Null);
        self.record("delete", collection, options);
        Err(AppError::not_found(collection, key))
    }
}

#[tokio::test]
async fn test_remote_mode_dispatches_to_injected_client() {
    let remote = Arc::new(RecordingRemote::default());
    let config = AppConfig {
        use_local_db: false,
        ..AppConfig::default()
    };
    let db = DbClient::from_config(&config, &Catalog::standard(), Some(remote.clone())).unwrap();
    assert_eq!(db.mode(), BackendMode::Remote);

    let users = db.collection("User");
    let opts = QueryOptions::new().filter(json!({ "userId": "U1" }));
    assert!(users.find_unique(opts.clone()).await.unwrap().is_none());
    assert_eq!(users.count(QueryOptions::new()).await.unwrap(), 42);
    assert!(users.find_many(QueryOptions::new()).await.unwrap().is_empty());
    users
        .create(QueryOptions::new().data(json!({ "userId": "U1" })))
        .await
        .unwrap();
    assert!(matches!(
        users.update(opts.clone().data(json!({ "name": "x" }))).await,
        Err(AppError::Backend(_))
    ));
    assert!(matches!(users.delete(opts.clone()).await, Err(AppError::NotFound { .. })));

    assert_eq!(
        remote.ops(),
        vec!["findUnique", "count", "findMany", "create", "update", "delete"]
    );
    let calls = remote.calls.lock().unwrap();
    assert_eq!(calls[0].1, "User");
    assert_eq!(calls[0].2, opts);
}

#[tokio::test]
async fn test_local_mode_ignores_remote_client() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(RecordingRemote::default());
    let config = AppConfig {
        use_local_db: true,
        data_root: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let db = DbClient::from_config(&config, &Catalog::standard(), Some(remote.clone())).unwrap();
    assert_eq!(db.mode(), BackendMode::Local);

    db.collection("Coupon")
        .create(QueryOptions::new().data(json!({ "couponId": "Z" })))
        .await
        .unwrap();
    assert!(remote.ops().is_empty());
    assert!(dir.path().join("Coupon.json").exists());
}

#[tokio::test]
async fn test_generate_key_works_against_remote_backend() {
    let remote = Arc::new(RecordingRemote::default());
    let db = DbClient::remote(remote.clone());
    let key = db
        .collection("Coupon")
        .generate_key("couponId", &KeyPolicy::default())
        .await
        .unwrap();
    assert_eq!(key.len(), 8);
    assert_eq!(remote.ops(), vec!["findUnique"]);
}

#[tokio::test]
async fn test_key_generation_exhausted_when_every_candidate_exists() {
    let env = init_test_env().await;
    let coupons = env.db.collection("Coupon");
    coupons
        .create(QueryOptions::new().data(json!({ "couponId": "A" })))
        .await
        .unwrap();

    let policy = KeyPolicy {
        length: 1,
        alphabet: "A".to_string(),
        max_attempts: 5,
    };
    match coupons.generate_key("couponId", &policy).await {
        Err(AppError::KeyGenerationExhausted { field, attempts }) => {
            assert_eq!(field, "couponId");
            assert_eq!(attempts, 5);
        }
        other => panic!("KeyGenerationExhausted attendu, reçu {:?}", other),
    }
}

#[tokio::test]
async fn test_copy_between_local_stores_is_replayable() {
    let src_env = init_test_env().await;
    let dst_env = init_test_env().await;
    let catalog = Catalog::standard();

    for id in ["U1", "U2"] {
        src_env
            .db
            .collection("User")
            .create(QueryOptions::new().data(json!({ "userId": id })))
            .await
            .unwrap();
    }
    src_env
        .db
        .collection("Coupon")
        .create(QueryOptions::new().data(json!({ "couponId": "C1" })))
        .await
        .unwrap();

    let src = LocalBackend::new(src_env.cfg.clone(), &catalog);
    let dst = LocalBackend::new(dst_env.cfg.clone(), &catalog);

    let first = copy_all(&src, &dst, &catalog).await.unwrap();
    assert_eq!(first["User"].copied, 2);
    assert_eq!(first["Coupon"].copied, 1);

    let second = copy_all(&src, &dst, &catalog).await.unwrap();
    assert_eq!(second["User"].copied, 0);
    assert_eq!(second["User"].skipped, 2);
    assert_eq!(
        dst_env.db.collection("User").count(QueryOptions::new()).await.unwrap(),
        2
    );
}
