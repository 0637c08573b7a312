// FICHIER : docstore/src/json_db/migrations/mod.rs

//! Passes de maintenance ponctuelles : aplatissement des enveloppes héritées
//! et copie d'un magasin vers un autre.

pub mod copier;

use crate::json_db::storage::StorageEngine;
use crate::utils::prelude::*;
use std::collections::BTreeMap;

pub use copier::{copy_all, copy_collection, CopyStats};

/// Réécrit une collection au format plat. Retourne le nombre de documents convertis.
pub async fn flatten_collection(storage: &StorageEngine, collection: &str) -> Result<usize> {
    let converted = storage.flatten(collection).await?;
    if converted > 0 {
        info!(collection, converted, "🧹 Enveloppes héritées aplaties");
    }
    Ok(converted)
}

/// Aplatit toutes les collections présentes sur disque.
pub async fn flatten_all(storage: &StorageEngine) -> Result<BTreeMap<String, usize>> {
    let mut report = BTreeMap::new();
    for collection in storage.list_collections().await? {
        let n = flatten_collection(storage, &collection).await?;
        report.insert(collection, n);
    }
    Ok(report)
}
