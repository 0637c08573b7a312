// FICHIER : docstore/src/client/local.rs

use super::backend::DocumentBackend;
use super::dates::rewrap_with_relations;
use super::options::QueryOptions;
use crate::catalog::Catalog;
use crate::json_db::collections::manager::CollectionsManager;
use crate::json_db::collections::update::parse_update;
use crate::json_db::collections::Document;
use crate::json_db::query::executor::project_fields;
use crate::json_db::query::parser::{parse_order_by, parse_select, parse_where};
use crate::json_db::query::{Query, QueryEngine, QueryFilter};
use crate::json_db::relations::{parse_include, IncludeItem, RelationRegistry, RelationResolver};
use crate::json_db::storage::{JsonDbConfig, StorageEngine};
use crate::utils::prelude::*;
use async_trait::async_trait;

const CREATE_KEYS: &[&str] = &["data", "select", "include"];
const FIND_UNIQUE_KEYS: &[&str] = &["where", "select", "include"];
const FIND_MANY_KEYS: &[&str] = &["where", "select", "include", "orderBy", "skip", "take"];
const COUNT_KEYS: &[&str] = &["where", "skip", "take"];
const UPDATE_KEYS: &[&str] = &["where", "data", "select", "include"];
const DELETE_KEYS: &[&str] = &["where", "select", "include"];

/// Backend fichiers JSON : déballe les options vers le moteur,
/// puis remet les résultats dans la forme du client distant.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    storage: StorageEngine,
    relations: RelationRegistry,
    date_fields: Vec<String>,
}

impl LocalBackend {
    pub fn new(config: JsonDbConfig, catalog: &Catalog) -> Self {
        Self {
            storage: StorageEngine::new(config.with_envelope_keys(catalog.envelope_keys())),
            relations: catalog.relation_registry().clone(),
            date_fields: catalog.date_field_names().to_vec(),
        }
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// `where` obligatoire et non vide (opérations ciblant un document).
    fn targeted_filter(&self, operation: &str, options: &QueryOptions) -> Result<QueryFilter> {
        parse_where(options.require_filter(operation)?)?.ok_or_else(|| {
            AppError::invalid(format!("{} : 'where' ne peut pas être vide", operation))
        })
    }

    /// Relations -> projection -> dates.
    async fn shape(
        &self,
        collection: &str,
        mut docs: Vec<Document>,
        options: &QueryOptions,
    ) -> Result<Vec<Document>> {
        let includes: Vec<IncludeItem> = match &options.include {
            Some(v) => parse_include(collection, v, &self.relations)?,
            None => Vec::new(),
        };
        let projection = match &options.select {
            Some(v) => parse_select(v)?,
            None => None,
        };

        RelationResolver::new(&self.storage)
            .resolve(&mut docs, &includes)
            .await?;

        if let Some(mut projection) = projection {
            if !projection.fields.is_empty() {
                for item in &includes {
                    projection.allow(item.output_key());
                }
            }
            for doc in docs.iter_mut() {
                *doc = project_fields(doc, &projection);
            }
        }

        let relation_keys: Vec<&str> = includes
            .iter()
            .filter(|i| matches!(i, IncludeItem::Attach { .. }))
            .map(IncludeItem::output_key)
            .collect();
        for doc in docs.iter_mut() {
            rewrap_with_relations(doc, &self.date_fields, &relation_keys);
        }
        Ok(docs)
    }

    async fn shape_one(
        &self,
        collection: &str,
        doc: Document,
        options: &QueryOptions,
    ) -> Result<Document> {
        let mut shaped = self.shape(collection, vec![doc], options).await?;
        shaped.pop().ok_or_else(|| {
            AppError::System(anyhow::anyhow!("Document perdu pendant la mise en forme"))
        })
    }
}

#[async_trait]
impl DocumentBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn create(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        options.ensure_only("create", CREATE_KEYS)?;
        let data = options.data_object("create")?;
        let doc = CollectionsManager::new(&self.storage).insert(collection, data).await?;
        self.shape_one(collection, doc, &options).await
    }

    async fn find_unique(
        &self,
        collection: &str,
        options: QueryOptions,
    ) -> Result<Option<Document>> {
        options.ensure_only("findUnique", FIND_UNIQUE_KEYS)?;
        let filter = self.targeted_filter("findUnique", &options)?;
        match QueryEngine::new(&self.storage).find_unique(collection, &filter).await? {
            Some(doc) => Ok(Some(self.shape_one(collection, doc, &options).await?)),
            None => Ok(None),
        }
    }

    async fn find_many(&self, collection: &str, options: QueryOptions) -> Result<Vec<Document>> {
        options.ensure_only("findMany", FIND_MANY_KEYS)?;
        let mut query = Query::new(collection);
        if let Some(w) = &options.filter {
            query.filter = parse_where(w)?;
        }
        if let Some(o) = &options.order_by {
            query.sort = parse_order_by(o)?;
        }
        query.offset = options.skip;
        query.limit = options.take;

        let result = QueryEngine::new(&self.storage).execute_query(&query).await?;
        self.shape(collection, result.documents, &options).await
    }

    async fn count(&self, collection: &str, options: QueryOptions) -> Result<usize> {
        options.ensure_only("count", COUNT_KEYS)?;
        let filter = match &options.filter {
            Some(w) => parse_where(w)?,
            None => None,
        };
        let total = QueryEngine::new(&self.storage)
            .count(collection, filter.as_ref())
            .await?;
        let after_skip = total.saturating_sub(options.skip.unwrap_or(0));
        Ok(options.take.map_or(after_skip, |t| after_skip.min(t)))
    }

    async fn update(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        options.ensure_only("update", UPDATE_KEYS)?;
        let filter = self.targeted_filter("update", &options)?;
        let updates = parse_update(&options.data_object("update")?)?;
        let doc = CollectionsManager::new(&self.storage)
            .update_first(collection, Some(&filter), updates)
            .await?;
        self.shape_one(collection, doc, &options).await
    }

    async fn delete(&self, collection: &str, options: QueryOptions) -> Result<Document> {
        options.ensure_only("delete", DELETE_KEYS)?;
        let filter = self.targeted_filter("delete", &options)?;
        let doc = CollectionsManager::new(&self.storage)
            .delete_first(collection, Some(&filter))
            .await?;
        self.shape_one(collection, doc, &options).await
    }
}
