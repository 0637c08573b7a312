// FICHIER : docstore/src/utils/json.rs

use crate::utils::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

// --- RE-EXPORTS (Single Source of Truth pour le JSON) ---
pub use serde_json::{json, Map, Value};

/// Parse une chaîne JSON en un type T.
/// L'erreur embarque un extrait du contenu pour aider au débogage.
pub fn parse<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(|e| {
        let snippet: String = s.chars().take(100).collect();
        AppError::invalid(format!("JSON invalide ({}) : {}", e, snippet))
    })
}

/// Convertit un type T en chaîne JSON formatée (pretty).
pub fn stringify_pretty<T: Serialize>(v: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(v)?)
}

pub fn from_value<T: DeserializeOwned>(v: Value) -> Result<T> {
    Ok(serde_json::from_value(v)?)
}

/// Fusion superficielle : chaque clé de `patch` écrase celle de `target`.
/// Les objets imbriqués sont remplacés, pas fusionnés.
pub fn merge_shallow(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (k, v) in patch {
        target.insert(k, v);
    }
}

/// Accès par chemin pointé (`profile.city`).
pub fn get_path<'a>(value: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = value.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
