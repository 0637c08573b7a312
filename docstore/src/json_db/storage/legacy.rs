// FICHIER : docstore/src/json_db/storage/legacy.rs

//! Normalisation de l'ancienne enveloppe `{ id, createdAt, updatedAt, data: { ... } }`.
//! Appliquée à chaque lecture, jamais à l'écriture : un document ré-enregistré devient plat.

use crate::json_db::collections::{FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT};
use serde_json::{Map, Value};

pub const ENVELOPE_FIELD: &str = "data";

const BOOKKEEPING: [&str; 3] = [FIELD_ID, FIELD_CREATED_AT, FIELD_UPDATED_AT];

/// Vrai si le document est une enveloppe héritée : un membre `data` objet, et au premier
/// niveau uniquement des champs de gestion, des champs repris dans `data`, ou des champs
/// de `tolerated` (clés naturelles de la collection).
pub fn is_legacy_envelope(doc: &Map<String, Value>, tolerated: &[String]) -> bool {
    let nested = match doc.get(ENVELOPE_FIELD) {
        Some(Value::Object(nested)) => nested,
        _ => return false,
    };
    doc.keys().all(|k| {
        k == ENVELOPE_FIELD
            || BOOKKEEPING.contains(&k.as_str())
            || nested.contains_key(k)
            || tolerated.iter().any(|t| t == k)
    })
}

/// `{..topLevelSaufData, ..champsImbriqués}` ; les champs imbriqués gagnent en cas de collision.
/// Itère jusqu'au point fixe, d'où `normalize(normalize(d)) == normalize(d)`.
pub fn normalize(mut doc: Map<String, Value>, tolerated: &[String]) -> Map<String, Value> {
    while is_legacy_envelope(&doc, tolerated) {
        let nested = match doc.remove(ENVELOPE_FIELD) {
            Some(Value::Object(nested)) => nested,
            _ => break,
        };
        for (k, v) in nested {
            doc.insert(k, v);
        }
    }
    doc
}
