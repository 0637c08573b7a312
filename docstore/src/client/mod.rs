// FICHIER : docstore/src/client/mod.rs

//! Façade de compatibilité : `db.collection("User").find_unique(options)` quel que soit le backend.

pub mod backend;
pub mod dates;
pub mod local;
pub mod options;

pub use backend::DocumentBackend;
pub use local::LocalBackend;
pub use options::QueryOptions;

use crate::catalog::Catalog;
use crate::json_db::collections::Document;
use crate::json_db::ids::{self, KeyPolicy};
use crate::json_db::storage::JsonDbConfig;
use crate::utils::config::BackendMode;
use crate::utils::prelude::*;
use std::sync::Arc;

/// Point d'entrée applicatif. Le backend est choisi une fois, à la construction.
#[derive(Clone)]
pub struct DbClient {
    backend: Arc<dyn DocumentBackend>,
    mode: BackendMode,
}

impl std::fmt::Debug for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbClient")
            .field("backend", &self.backend.name())
            .field("mode", &self.mode)
            .finish()
    }
}

impl DbClient {
    pub fn local(config: JsonDbConfig, catalog: &Catalog) -> Self {
        Self {
            backend: Arc::new(LocalBackend::new(config, catalog)),
            mode: BackendMode::Local,
        }
    }

    pub fn remote(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            mode: BackendMode::Remote,
        }
    }

    /// Sélection selon `use_local_db`. En mode distant, le client doit être fourni.
    pub fn from_config(
        config: &AppConfig,
        catalog: &Catalog,
        remote: Option<Arc<dyn DocumentBackend>>,
    ) -> Result<Self> {
        let client = match (config.backend_mode(), remote) {
            (BackendMode::Local, _) => Self::local(JsonDbConfig::from_app(config), catalog),
            (BackendMode::Remote, Some(backend)) => Self::remote(backend),
            (BackendMode::Remote, None) => {
                return Err(AppError::Config(
                    "Mode distant demandé mais aucun client distant n'a été fourni".to_string(),
                ))
            }
        };
        info!(backend = client.backend.name(), "🗄️ Backend documentaire sélectionné");
        Ok(client)
    }

    /// Configuration globale (`AppConfig::init`) puis sélection du backend.
    pub fn init(catalog: &Catalog, remote: Option<Arc<dyn DocumentBackend>>) -> Result<Self> {
        let config = AppConfig::init()?;
        Self::from_config(config, catalog, remote)
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub fn backend(&self) -> Arc<dyn DocumentBackend> {
        self.backend.clone()
    }

    pub fn collection(&self, name: &str) -> CollectionHandle {
        CollectionHandle {
            backend: self.backend.clone(),
            name: name.to_string(),
        }
    }
}

/// Les six opérations d'une collection.
#[derive(Clone)]
pub struct CollectionHandle {
    backend: Arc<dyn DocumentBackend>,
    name: String,
}

impl CollectionHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn create(&self, options: QueryOptions) -> Result<Document> {
        debug!(collection = %self.name, backend = self.backend.name(), "create");
        self.backend.create(&self.name, options).await
    }

    pub async fn find_unique(&self, options: QueryOptions) -> Result<Option<Document>> {
        debug!(collection = %self.name, backend = self.backend.name(), "findUnique");
        self.backend.find_unique(&self.name, options).await
    }

    pub async fn find_many(&self, options: QueryOptions) -> Result<Vec<Document>> {
        debug!(collection = %self.name, backend = self.backend.name(), "findMany");
        self.backend.find_many(&self.name, options).await
    }

    pub async fn count(&self, options: QueryOptions) -> Result<usize> {
        debug!(collection = %self.name, backend = self.backend.name(), "count");
        self.backend.count(&self.name, options).await
    }

    pub async fn update(&self, options: QueryOptions) -> Result<Document> {
        debug!(collection = %self.name, backend = self.backend.name(), "update");
        self.backend.update(&self.name, options).await
    }

    pub async fn delete(&self, options: QueryOptions) -> Result<Document> {
        debug!(collection = %self.name, backend = self.backend.name(), "delete");
        self.backend.delete(&self.name, options).await
    }

    /// Génère une clé naturelle absente de la collection, via `find_unique` sur le backend actif.
    /// L'unicité n'est garantie qu'au moment de la vérification : deux appelants concurrents
    /// peuvent obtenir la même clé.
    pub async fn generate_key(&self, field: &str, policy: &KeyPolicy) -> Result<String> {
        ids::generate_unique_key(field, policy, |candidate| async move {
            let options = QueryOptions::new().filter(json!({ field: candidate }));
            Ok::<bool, AppError>(self.find_unique(options).await?.is_some())
        })
        .await
    }
}
