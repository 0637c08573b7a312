// FICHIER : docstore/src/json_db/storage/file_storage.rs

use crate::json_db::collections::Document;
use crate::utils::fs::{self, Path};
use crate::utils::prelude::*;

/// Lit un fichier de collection tel qu'il est sur disque.
/// Fichier absent ou vide => collection vide. Contenu illisible => `StorageUnavailable`.
pub async fn read_raw(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let content = match fs::read_optional(path).await? {
        Some(c) => c,
        None => return Ok(Vec::new()),
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::storage(path, format!("JSON corrompu : {}", e)))?;

    let items = match parsed {
        Value::Array(items) => items,
        _ => {
            return Err(AppError::storage(
                path,
                "le fichier de collection doit contenir un tableau JSON",
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::storage(
                path,
                format!("l'élément {} n'est pas un objet JSON", i),
            )),
        })
        .collect()
}

/// Réécrit la collection entière (JSON indenté, écriture atomique).
pub async fn write_all(path: &Path, docs: &[Document]) -> Result<()> {
    let content = serde_json::to_string_pretty(docs)?;
    fs::write_atomic(path, content.as_bytes()).await
}

/// Variante brute utilisée par les migrations.
pub async fn write_raw(path: &Path, docs: &[Map<String, Value>]) -> Result<()> {
    let content = serde_json::to_string_pretty(docs)?;
    fs::write_atomic(path, content.as_bytes()).await
}
