// FICHIER : docstore/src/json_db/collections/manager.rs

use super::update::{apply_updates, FieldUpdate};
use super::{now_timestamp, Document, FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT};
use crate::json_db::ids;
use crate::json_db::query::executor::matches;
use crate::json_db::query::QueryFilter;
use crate::json_db::storage::StorageEngine;
use crate::utils::prelude::*;

/// Mutations d'une collection. Chacune est un cycle lecture-modification-écriture
/// exécuté sous le verrou d'écriture de la collection.
#[derive(Debug)]
pub struct CollectionsManager<'a> {
    pub storage: &'a StorageEngine,
}

impl<'a> CollectionsManager<'a> {
    pub fn new(storage: &'a StorageEngine) -> Self {
        Self { storage }
    }

    // --- MÉTHODES DE LECTURE ---

    pub async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.storage.load(collection).await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.storage.list_collections().await
    }

    // --- MÉTHODES D'ÉCRITURE ---

    /// Ajoute un document. `id`, `createdAt` et `updatedAt` fournis par l'appelant sont conservés,
    /// sinon ils sont générés.
    pub async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<Document> {
        let doc = prepare_new_document(data)?;
        let created = self
            .storage
            .mutate(collection, |docs| {
                if let Some(id) = doc.id() {
                    if docs.iter().any(|d| d.id() == Some(id)) {
                        return Err(AppError::invalid(format!(
                            "Un document '{}' d'id '{}' existe déjà",
                            collection, id
                        )));
                    }
                }
                docs.push(doc.clone());
                Ok(doc)
            })
            .await?;
        debug!(collection, id = ?created.id(), "📝 Document créé");
        Ok(created)
    }

    /// Met à jour le premier document correspondant au filtre ; `updatedAt` est rafraîchi.
    pub async fn update_first(
        &self,
        collection: &str,
        filter: Option<&QueryFilter>,
        updates: Vec<(String, FieldUpdate)>,
    ) -> Result<Document> {
        let updated = self
            .storage
            .mutate(collection, |docs| {
                let doc = docs
                    .iter_mut()
                    .find(|d| filter.map_or(true, |f| matches(d, f)))
                    .ok_or_else(|| not_found(collection, filter))?;
                apply_updates(doc, updates)?;
                doc.insert(FIELD_UPDATED_AT.to_string(), Value::String(now_timestamp()));
                Ok(doc.clone())
            })
            .await?;
        debug!(collection, id = ?updated.id(), "✏️ Document mis à jour");
        Ok(updated)
    }

    /// Retire le premier document correspondant et le retourne.
    pub async fn delete_first(
        &self,
        collection: &str,
        filter: Option<&QueryFilter>,
    ) -> Result<Document> {
        let removed = self
            .storage
            .mutate(collection, |docs| {
                let pos = docs
                    .iter()
                    .position(|d| filter.map_or(true, |f| matches(d, f)))
                    .ok_or_else(|| not_found(collection, filter))?;
                Ok(docs.remove(pos))
            })
            .await?;
        debug!(collection, id = ?removed.id(), "🗑️ Document supprimé");
        Ok(removed)
    }
}

fn not_found(collection: &str, filter: Option<&QueryFilter>) -> AppError {
    match filter {
        Some(f) => AppError::not_found(collection, f),
        None => AppError::not_found(collection, "{}"),
    }
}

/// `id` en tête, puis les champs de l'appelant, puis l'horodatage.
fn prepare_new_document(mut data: Map<String, Value>) -> Result<Document> {
    let id = match data.remove(FIELD_ID) {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        None | Some(Value::Null) => ids::new_id(),
        Some(other) => {
            return Err(AppError::invalid(format!(
                "'id' doit être une chaîne non vide, reçu : {}",
                other
            )))
        }
    };

    let mut doc = Document::new();
    doc.insert(FIELD_ID.to_string(), Value::String(id));
    doc.extend(data);

    let now = now_timestamp();
    for field in [FIELD_CREATED_AT, FIELD_UPDATED_AT] {
        let keep = matches!(doc.get(field), Some(Value::String(s)) if !s.is_empty());
        if !keep {
            doc.insert(field.to_string(), Value::String(now.clone()));
        }
    }
    Ok(doc)
}
