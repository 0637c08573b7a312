// FICHIER : docstore/src/json_db/collections/update.rs

//! Opérateurs de mise à jour : `{set}`, `{push}`, `{increment}`, `{decrement}`.
//! Tout autre objet est une valeur littérale.

use super::{Document, FIELD_CREATED_AT, FIELD_ID};
use crate::utils::prelude::*;
use serde_json::Number;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(Value),
    Push(Vec<Value>),
    Increment(Number),
    Decrement(Number),
}

/// Champs figés à la création : un `update` qui les mentionne est refusé.
const IMMUTABLE_FIELDS: &[&str] = &[FIELD_ID, FIELD_CREATED_AT];

/// `data` d'un `update` -> liste ordonnée de modifications par champ.
pub fn parse_update(data: &Map<String, Value>) -> Result<Vec<(String, FieldUpdate)>> {
    data.iter()
        .map(|(field, value)| Ok((field.clone(), parse_field_update(field, value)?)))
        .collect()
}

fn parse_field_update(field: &str, value: &Value) -> Result<FieldUpdate> {
    let single = match value {
        Value::Object(map) if map.len() == 1 => map.iter().next(),
        _ => None,
    };

    match single {
        Some((op, arg)) if op == "set" => Ok(FieldUpdate::Set(arg.clone())),
        Some((op, arg)) if op == "push" => Ok(FieldUpdate::Push(match arg {
            Value::Array(items) => items.clone(),
            scalar => vec![scalar.clone()],
        })),
        Some((op, arg)) if op == "increment" || op == "decrement" => {
            let n = match arg {
                Value::Number(n) => n.clone(),
                other => {
                    return Err(AppError::invalid(format!(
                        "'{}' sur '{}' attend un nombre, reçu : {}",
                        op, field, other
                    )))
                }
            };
            Ok(if op == "increment" {
                FieldUpdate::Increment(n)
            } else {
                FieldUpdate::Decrement(n)
            })
        }
        _ => Ok(FieldUpdate::Set(value.clone())),
    }
}

/// Applique les modifications dans l'ordre. Les champs non mentionnés sont conservés.
pub fn apply_updates(doc: &mut Document, updates: Vec<(String, FieldUpdate)>) -> Result<()> {
    if let Some((field, _)) = updates
        .iter()
        .find(|(f, _)| IMMUTABLE_FIELDS.contains(&f.as_str()))
    {
        return Err(AppError::invalid(format!(
            "'{}' ne peut pas être modifié par un update",
            field
        )));
    }
    for (field, update) in updates {
        let next = match update {
            FieldUpdate::Set(v) => v,
            FieldUpdate::Push(items) => match doc.remove(&field) {
                None | Some(Value::Null) => Value::Array(items),
                Some(Value::Array(mut arr)) => {
                    arr.extend(items);
                    Value::Array(arr)
                }
                Some(other) => {
                    doc.insert(field.clone(), other);
                    return Err(AppError::invalid(format!(
                        "'push' impossible : '{}' n'est pas un tableau",
                        field
                    )));
                }
            },
            FieldUpdate::Increment(delta) => add(doc.get(&field), &field, &delta, false)?,
            FieldUpdate::Decrement(delta) => add(doc.get(&field), &field, &delta, true)?,
        };
        doc.insert(field, next);
    }
    Ok(())
}

/// Arithmétique entière tant que possible, sinon flottante. Champ absent == 0.
fn add(current: Option<&Value>, field: &str, delta: &Number, negate: bool) -> Result<Value> {
    let current = match current {
        None | Some(Value::Null) => Number::from(0),
        Some(Value::Number(n)) => n.clone(),
        Some(other) => {
            return Err(AppError::invalid(format!(
                "Opération arithmétique impossible sur '{}' : {}",
                field, other
            )))
        }
    };

    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        let res = if negate { a.checked_sub(b) } else { a.checked_add(b) };
        if let Some(r) = res {
            return Ok(Value::from(r));
        }
    }

    let a = current.as_f64().unwrap_or(0.0);
    let b = delta.as_f64().unwrap_or(0.0);
    let res = if negate { a - b } else { a + b };
    Number::from_f64(res)
        .map(Value::Number)
        .ok_or_else(|| AppError::invalid(format!("Résultat non représentable pour '{}'", field)))
}
