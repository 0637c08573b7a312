// FICHIER : docstore/src/json_db/query/executor.rs

use super::{
    ComparisonOperator, Condition, Projection, Query, QueryFilter, QueryResult, SortField,
    SortOrder,
};
use crate::json_db::collections::Document;
use crate::json_db::storage::StorageEngine;
use crate::utils::json::get_path;
use crate::utils::prelude::*;
use serde_json::Number;
use std::cmp::Ordering;

/// Exécution par balayage linéaire : pas d'index, chaque requête relit le fichier.
pub struct QueryEngine<'a> {
    storage: &'a StorageEngine,
}

impl<'a> QueryEngine<'a> {
    pub fn new(storage: &'a StorageEngine) -> Self {
        Self { storage }
    }

    pub async fn execute_query(&self, query: &Query) -> Result<QueryResult> {
        let documents = self.storage.load(&query.collection).await?;
        let result = apply_query(documents, query);
        debug!(
            collection = %query.collection,
            matched = result.total_count,
            returned = result.documents.len(),
            "🔍 Requête exécutée"
        );
        Ok(result)
    }

    pub async fn count(&self, collection: &str, filter: Option<&QueryFilter>) -> Result<usize> {
        let documents = self.storage.load(collection).await?;
        Ok(match filter {
            Some(f) => documents.iter().filter(|d| matches(d, f)).count(),
            None => documents.len(),
        })
    }

    /// Premier document correspondant. Plusieurs correspondances signalent une clé
    /// naturelle dupliquée côté appelant.
    pub async fn find_unique(
        &self,
        collection: &str,
        filter: &QueryFilter,
    ) -> Result<Option<Document>> {
        let documents = self.storage.load(collection).await?;
        let mut hits = documents.into_iter().filter(|d| matches(d, filter));
        let first = hits.next();
        if first.is_some() && hits.next().is_some() {
            warn!(
                collection,
                filter = %filter,
                "⚠️ find_unique : plusieurs documents correspondent"
            );
        }
        Ok(first)
    }
}

/// Filtre -> tri -> pagination -> projection, sur des documents déjà chargés.
pub fn apply_query(mut documents: Vec<Document>, query: &Query) -> QueryResult {
    // 1. FILTRAGE
    if let Some(filter) = &query.filter {
        documents.retain(|doc| matches(doc, filter));
    }

    // 2. TRI (stable : l'ordre d'insertion départage les égalités)
    if let Some(sort) = &query.sort {
        documents.sort_by(|a, b| compare_docs(a, b, sort));
    }

    let total_count = documents.len() as u64;
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);

    // 3. PAGINATION
    let mut paged: Vec<Document> = documents.into_iter().skip(offset).take(limit).collect();

    // 4. PROJECTION
    if let Some(projection) = &query.projection {
        for doc in &mut paged {
            *doc = project_fields(doc, projection);
        }
    }

    QueryResult {
        documents: paged,
        total_count,
    }
}

pub fn matches(doc: &Document, filter: &QueryFilter) -> bool {
    match filter {
        QueryFilter::And(parts) => parts.iter().all(|f| matches(doc, f)),
        QueryFilter::Or(parts) => parts.iter().any(|f| matches(doc, f)),
        QueryFilter::Not(inner) => !matches(doc, inner),
        QueryFilter::Condition(c) => evaluate_condition(doc, c),
    }
}

fn field_value<'b>(doc: &'b Document, path: &str) -> Option<&'b Value> {
    if path.contains('.') {
        get_path(doc, path)
    } else {
        doc.get(path)
    }
}

fn evaluate_condition(doc: &Document, condition: &Condition) -> bool {
    // Champ absent == null
    let val = field_value(doc, &condition.field).unwrap_or(&Value::Null);
    let target = &condition.value;

    match condition.operator {
        ComparisonOperator::Eq => values_equal(val, target),
        ComparisonOperator::Ne => !values_equal(val, target),

        ComparisonOperator::Gt => compare_values(val, target) == Some(Ordering::Greater),
        ComparisonOperator::Gte => matches!(
            compare_values(val, target),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ComparisonOperator::Lt => compare_values(val, target) == Some(Ordering::Less),
        ComparisonOperator::Lte => matches!(
            compare_values(val, target),
            Some(Ordering::Less | Ordering::Equal)
        ),

        ComparisonOperator::Contains => match (val, target) {
            (Value::String(s), Value::String(sub)) => {
                s.to_lowercase().contains(&sub.to_lowercase())
            }
            _ => false,
        },
        ComparisonOperator::StartsWith => match (val, target) {
            (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
            _ => false,
        },
        ComparisonOperator::EndsWith => match (val, target) {
            (Value::String(s), Value::String(suffix)) => s.ends_with(suffix.as_str()),
            _ => false,
        },

        ComparisonOperator::In => target
            .as_array()
            .is_some_and(|list| list.iter().any(|v| values_equal(val, v))),
        ComparisonOperator::NotIn => target
            .as_array()
            .is_some_and(|list| !list.iter().any(|v| values_equal(val, v))),

        ComparisonOperator::Has => val
            .as_array()
            .is_some_and(|arr| arr.iter().any(|item| values_equal(item, target))),
    }
}

/// Égalité JSON, avec comparaison numérique exacte (`1 == 1.0`, mais
/// `9007199254740993 != 9007199254740992`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(n1), Value::Number(n2)) => compare_numbers(n1, n2) == Some(Ordering::Equal),
        _ => false,
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Entier contre flottant, sans passer l'entier par `f64`.
fn compare_int_float(i: i128, f: f64) -> Ordering {
    if f >= i128::MAX as f64 {
        return Ordering::Less;
    }
    if f <= i128::MIN as f64 {
        return Ordering::Greater;
    }
    match i.cmp(&(f.trunc() as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&f.fract()).unwrap_or(Ordering::Equal),
        other => other,
    }
}

/// Entiers comparés exactement (i64/u64), `f64` seulement entre deux flottants.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        (Some(x), None) => Some(compare_int_float(x, b.as_f64()?)),
        (None, Some(y)) => Some(compare_int_float(y, a.as_f64()?).reverse()),
        (None, None) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// `None` si les deux valeurs ne sont pas comparables (types différents, null, objets).
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(n1), Value::Number(n2)) => compare_numbers(n1, n2),
        (Value::String(s1), Value::String(s2)) => Some(s1.cmp(s2)),
        (Value::Bool(b1), Value::Bool(b2)) => Some(b1.cmp(b2)),
        _ => None,
    }
}

/// Rang de type pour le tri : null < booléen < nombre < chaîne < tableau < objet.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_same_rank(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_json_values(Some(l), Some(r)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

/// Ordre total pour le tri : valeurs absentes (ou null) en premier, puis rang de type,
/// puis valeur.
pub fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| compare_same_rank(a, b))
}

fn compare_docs(a: &Document, b: &Document, sort: &SortField) -> Ordering {
    let cmp = compare_json_values(field_value(a, &sort.field), field_value(b, &sort.field));
    match sort.order {
        SortOrder::Asc => cmp,
        SortOrder::Desc => cmp.reverse(),
    }
}

/// Liste blanche vide => document complet. Un chemin pointé reconstruit l'objet
/// imbriqué (`"profile.city"` -> `{ "profile": { "city": .. } }`).
pub fn project_fields(doc: &Document, projection: &Projection) -> Document {
    if projection.fields.is_empty() {
        return doc.clone();
    }
    let mut out = Map::new();
    for field in &projection.fields {
        if let Some(val) = field_value(doc, field) {
            insert_path(&mut out, field, val.clone());
        }
    }
    Document::from_map(out)
}

fn insert_path(out: &mut Map<String, Value>, path: &str, val: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), val);
        }
        Some((head, rest)) => {
            let slot = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = slot {
                insert_path(inner, rest, val);
            }
        }
    }
}
