// FICHIER : docstore/src/json_db/relations/resolver.rs

use super::{IncludeItem, Relation, RelationKind, COUNT_KEY};
use crate::json_db::collections::Document;
use crate::json_db::query::executor::{project_fields, values_equal};
use crate::json_db::storage::StorageEngine;
use crate::utils::prelude::*;
use std::collections::HashMap;

/// Résolution par balayage : O(m) par relation et par document.
/// Chaque collection cible n'est chargée qu'une fois par appel.
pub struct RelationResolver<'a> {
    storage: &'a StorageEngine,
}

impl<'a> RelationResolver<'a> {
    pub fn new(storage: &'a StorageEngine) -> Self {
        Self { storage }
    }

    /// Augmente chaque document avec les relations demandées.
    pub async fn resolve(&self, documents: &mut [Document], items: &[IncludeItem]) -> Result<()> {
        if documents.is_empty() || items.is_empty() {
            return Ok(());
        }

        let mut loaded: HashMap<String, Vec<Document>> = HashMap::new();
        for item in items {
            let targets: Vec<&Relation> = match item {
                IncludeItem::Attach { relation, .. } => vec![relation],
                IncludeItem::Count { relations } => relations.iter().collect(),
            };
            for relation in targets {
                if !loaded.contains_key(&relation.target) {
                    let docs = self.storage.load(&relation.target).await?;
                    loaded.insert(relation.target.clone(), docs);
                }
            }
        }

        for doc in documents.iter_mut() {
            for item in items {
                match item {
                    IncludeItem::Attach { relation, select } => {
                        let related = loaded
                            .get(&relation.target)
                            .map(Vec::as_slice)
                            .unwrap_or(&[]);
                        let value = attach(doc, relation, related, select.as_ref());
                        doc.insert(relation.name.clone(), value);
                    }
                    IncludeItem::Count { relations } => {
                        let mut counts = Map::new();
                        for relation in relations {
                            let related = loaded
                                .get(&relation.target)
                                .map(Vec::as_slice)
                                .unwrap_or(&[]);
                            let n = referencing(doc, relation, related).count();
                            counts.insert(relation.name.clone(), Value::from(n));
                        }
                        doc.insert(COUNT_KEY.to_string(), Value::Object(counts));
                    }
                }
            }
        }
        debug!(documents = documents.len(), includes = items.len(), "🔗 Relations résolues");
        Ok(())
    }

    pub async fn resolve_one(&self, document: &mut Document, items: &[IncludeItem]) -> Result<()> {
        self.resolve(std::slice::from_mut(document), items).await
    }
}

fn attach(
    doc: &Document,
    relation: &Relation,
    related: &[Document],
    select: Option<&crate::json_db::query::Projection>,
) -> Value {
    let shape = |d: &Document| match select {
        Some(p) => project_fields(d, p).into_value(),
        None => d.clone().into_value(),
    };

    match &relation.kind {
        RelationKind::BelongsTo {
            local_field,
            foreign_field,
        } => {
            let key = match doc.get(local_field) {
                None | Some(Value::Null) => return Value::Null,
                Some(k) => k,
            };
            related
                .iter()
                .find(|r| r.get(foreign_field).is_some_and(|v| values_equal(v, key)))
                .map(shape)
                .unwrap_or(Value::Null)
        }
        RelationKind::HasMany { .. } => {
            Value::Array(referencing(doc, relation, related).map(shape).collect())
        }
    }
}

/// Documents de la cible portant l'`id` interne du document courant.
fn referencing<'r>(
    doc: &Document,
    relation: &Relation,
    related: &'r [Document],
) -> Box<dyn Iterator<Item = &'r Document> + 'r> {
    let (id, foreign_field) = match (doc.id(), &relation.kind) {
        (Some(id), RelationKind::HasMany { foreign_field }) => {
            (id.to_string(), foreign_field.clone())
        }
        _ => return Box::new(std::iter::empty()),
    };
    Box::new(
        related
            .iter()
            .filter(move |r| r.get_str(&foreign_field) == Some(id.as_str())),
    )
}
