// FICHIER : docstore/src/json_db/query/parser.rs

//! Traduction des options d'appel (`where`, `orderBy`, `select`) vers les types du moteur.

use super::{ComparisonOperator, Condition, Projection, QueryFilter, SortField, SortOrder};
use crate::utils::prelude::*;

pub const OP_AND: &str = "AND";
pub const OP_OR: &str = "OR";
pub const OP_NOT: &str = "NOT";

/// `where` -> arbre de prédicats. `None` si aucun critère (tous les documents).
pub fn parse_where(value: &Value) -> Result<Option<QueryFilter>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => {
            let filter = parse_object(map)?;
            match &filter {
                QueryFilter::And(parts) if parts.is_empty() => Ok(None),
                _ => Ok(Some(filter)),
            }
        }
        other => Err(AppError::invalid(format!(
            "'where' doit être un objet, reçu : {}",
            other
        ))),
    }
}

fn parse_object(map: &Map<String, Value>) -> Result<QueryFilter> {
    let mut parts = Vec::new();
    for (key, value) in map {
        match key.as_str() {
            OP_AND => parts.push(QueryFilter::And(parse_branches(OP_AND, value)?)),
            OP_OR => match value {
                Value::Array(_) => parts.push(QueryFilter::Or(parse_branches(OP_OR, value)?)),
                _ => return Err(AppError::invalid("'OR' attend un tableau de conditions")),
            },
            OP_NOT => {
                let inner = collapse(parse_branches(OP_NOT, value)?);
                parts.push(QueryFilter::negate(inner));
            }
            field => parts.extend(parse_field(field, value)?),
        }
    }
    Ok(collapse(parts))
}

/// Un objet ou un tableau d'objets.
fn parse_branches(op: &str, value: &Value) -> Result<Vec<QueryFilter>> {
    match value {
        Value::Object(map) => Ok(vec![parse_object(map)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => parse_object(map),
                other => Err(AppError::invalid(format!(
                    "'{}' attend des objets, reçu : {}",
                    op, other
                ))),
            })
            .collect(),
        other => Err(AppError::invalid(format!(
            "'{}' attend un objet ou un tableau, reçu : {}",
            op, other
        ))),
    }
}

fn collapse(mut parts: Vec<QueryFilter>) -> QueryFilter {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        QueryFilter::And(parts)
    }
}

fn parse_field(field: &str, value: &Value) -> Result<Vec<QueryFilter>> {
    match value {
        Value::Object(ops) => ops
            .iter()
            .map(|(op, arg)| parse_operator(field, op, arg))
            .collect(),
        scalar => Ok(vec![QueryFilter::eq(field, scalar.clone())]),
    }
}

fn parse_operator(field: &str, op: &str, arg: &Value) -> Result<QueryFilter> {
    let cond = |operator: ComparisonOperator| -> Result<QueryFilter> {
        Ok(QueryFilter::Condition(Condition::new(field, operator, arg.clone())))
    };

    match op {
        "equals" => cond(ComparisonOperator::Eq),
        "contains" | "startsWith" | "endsWith" => {
            if !arg.is_string() {
                return Err(AppError::invalid(format!(
                    "'{}' sur '{}' attend une chaîne",
                    op, field
                )));
            }
            cond(match op {
                "contains" => ComparisonOperator::Contains,
                "startsWith" => ComparisonOperator::StartsWith,
                _ => ComparisonOperator::EndsWith,
            })
        }
        "in" | "notIn" => {
            if !arg.is_array() {
                return Err(AppError::invalid(format!(
                    "'{}' sur '{}' attend un tableau",
                    op, field
                )));
            }
            cond(if op == "in" {
                ComparisonOperator::In
            } else {
                ComparisonOperator::NotIn
            })
        }
        "has" => {
            if arg.is_object() || arg.is_array() {
                return Err(AppError::invalid(format!(
                    "'has' sur '{}' attend une valeur scalaire",
                    field
                )));
            }
            cond(ComparisonOperator::Has)
        }
        "gt" => cond(ComparisonOperator::Gt),
        "gte" => cond(ComparisonOperator::Gte),
        "lt" => cond(ComparisonOperator::Lt),
        "lte" => cond(ComparisonOperator::Lte),
        "not" => match arg {
            Value::Object(ops) if ops.is_empty() => Err(AppError::invalid(format!(
                "'not' vide sur '{}'",
                field
            ))),
            Value::Object(_) => Ok(QueryFilter::negate(collapse(parse_field(field, arg)?))),
            _ => cond(ComparisonOperator::Ne),
        },
        other => Err(AppError::unsupported(field, other)),
    }
}

/// `orderBy` : `{champ: "asc"|"desc"}` ou tableau d'un seul élément de cette forme.
pub fn parse_order_by(value: &Value) -> Result<Option<SortField>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => match items.as_slice() {
            [] => Ok(None),
            [single] => parse_order_by(single),
            _ => Err(AppError::invalid("Tri multi-critères non supporté")),
        },
        Value::Object(map) => {
            let mut entries = map.iter();
            let (field, dir) = match (entries.next(), entries.next()) {
                (None, _) => return Ok(None),
                (Some(entry), None) => entry,
                (Some(_), Some(_)) => {
                    return Err(AppError::invalid("Tri multi-critères non supporté"))
                }
            };
            let order = match dir.as_str().map(str::to_ascii_lowercase).as_deref() {
                Some("asc") => SortOrder::Asc,
                Some("desc") => SortOrder::Desc,
                _ => {
                    return Err(AppError::invalid(format!(
                        "Direction de tri invalide pour '{}' : {}",
                        field, dir
                    )))
                }
            };
            Ok(Some(SortField {
                field: field.clone(),
                order,
            }))
        }
        other => Err(AppError::invalid(format!("'orderBy' invalide : {}", other))),
    }
}

/// `select` : `{champ: true|false}`. Seuls les champs à `true` sont conservés.
pub fn parse_select(value: &Value) -> Result<Option<Projection>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => {
            let mut fields = Vec::new();
            for (field, flag) in map {
                match flag {
                    Value::Bool(true) => fields.push(field.clone()),
                    Value::Bool(false) => {}
                    other => {
                        return Err(AppError::invalid(format!(
                            "'select.{}' attend un booléen, reçu : {}",
                            field, other
                        )))
                    }
                }
            }
            Ok(Some(Projection::new(fields)))
        }
        other => Err(AppError::invalid(format!("'select' invalide : {}", other))),
    }
}
