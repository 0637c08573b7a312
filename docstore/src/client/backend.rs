// FICHIER : docstore/src/client/backend.rs

use super::options::QueryOptions;
use crate::json_db::collections::Document;
use crate::utils::prelude::*;
use async_trait::async_trait;

/// Le contrat d'appel commun aux deux backends.
/// Le magasin local l'implémente ; l'application fournit l'implémentation distante.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Nom court pour les logs
    fn name(&self) -> &'static str;

    async fn create(&self, collection: &str, options: QueryOptions) -> Result<Document>;

    async fn find_unique(
        &self,
        collection: &str,
        options: QueryOptions,
    ) -> Result<Option<Document>>;

    async fn find_many(&self, collection: &str, options: QueryOptions) -> Result<Vec<Document>>;

    async fn count(&self, collection: &str, options: QueryOptions) -> Result<usize>;

    /// Premier document correspondant à `where`. Aucun => `NotFound`.
    async fn update(&self, collection: &str, options: QueryOptions) -> Result<Document>;

    /// Premier document correspondant à `where`. Aucun => `NotFound`.
    async fn delete(&self, collection: &str, options: QueryOptions) -> Result<Document>;
}
