// FICHIER : docstore/src/client/dates.rs

//! Remise en forme des champs date, comme les renvoie le client distant.

use crate::json_db::collections::{format_timestamp, parse_timestamp, Document};
use crate::utils::prelude::*;

/// Réécrit en forme canonique (`YYYY-MM-DDTHH:MM:SS.mmmZ`) les champs date lisibles.
/// Les valeurs non interprétables sont laissées telles quelles.
pub fn rewrap_dates(doc: &mut Document, date_fields: &[String]) {
    rewrap_map(doc, date_fields);
}

/// Idem, en descendant dans les relations incluses (objets et tableaux d'objets).
pub fn rewrap_with_relations(doc: &mut Document, date_fields: &[String], relation_keys: &[&str]) {
    rewrap_map(doc, date_fields);
    for key in relation_keys {
        match doc.get_mut(*key) {
            Some(Value::Object(nested)) => rewrap_map(nested, date_fields),
            Some(Value::Array(items)) => {
                for item in items.iter_mut() {
                    if let Value::Object(nested) = item {
                        rewrap_map(nested, date_fields);
                    }
                }
            }
            _ => {}
        }
    }
}

fn rewrap_map(map: &mut Map<String, Value>, date_fields: &[String]) {
    for field in date_fields {
        if let Some(Value::String(raw)) = map.get_mut(field.as_str()) {
            if let Some(ts) = parse_timestamp(raw) {
                *raw = format_timestamp(&ts);
            }
        }
    }
}
