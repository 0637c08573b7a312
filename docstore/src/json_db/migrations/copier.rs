// FICHIER : docstore/src/json_db/migrations/copier.rs

//! Copie d'un backend vers un autre (outil opérateur, hors façade).
//! Les documents dont la clé naturelle existe déjà dans la destination sont ignorés,
//! ce qui rend la copie rejouable.

use crate::catalog::Catalog;
use crate::client::{DocumentBackend, QueryOptions};
use crate::json_db::collections::FIELD_ID;
use crate::utils::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    pub copied: usize,
    pub skipped: usize,
}

pub async fn copy_collection(
    src: &dyn DocumentBackend,
    dst: &dyn DocumentBackend,
    collection: &str,
    natural_key: Option<&str>,
) -> Result<CopyStats> {
    let key_field = natural_key.unwrap_or(FIELD_ID);
    let documents = src.find_many(collection, QueryOptions::new()).await?;
    let mut stats = CopyStats::default();

    for doc in documents {
        if let Some(key) = doc.get(key_field).filter(|v| !v.is_null()).cloned() {
            let lookup = QueryOptions::new().filter(json!({ key_field: key }));
            if dst.find_unique(collection, lookup).await?.is_some() {
                stats.skipped += 1;
                continue;
            }
        } else {
            warn!(
                collection,
                field = key_field,
                "⚠️ Document sans clé naturelle, copié sans vérification"
            );
        }
        dst.create(collection, QueryOptions::new().data(doc.into_value()))
            .await?;
        stats.copied += 1;
    }

    info!(
        collection,
        src = src.name(),
        dst = dst.name(),
        copied = stats.copied,
        skipped = stats.skipped,
        "📦 Collection copiée"
    );
    Ok(stats)
}

/// Copie chaque collection du catalogue.
pub async fn copy_all(
    src: &dyn DocumentBackend,
    dst: &dyn DocumentBackend,
    catalog: &Catalog,
) -> Result<BTreeMap<String, CopyStats>> {
    let mut report = BTreeMap::new();
    for spec in catalog.collections() {
        let stats = copy_collection(src, dst, &spec.name, spec.natural_key.as_deref()).await?;
        report.insert(spec.name.clone(), stats);
    }
    Ok(report)
}
