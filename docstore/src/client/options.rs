// FICHIER : docstore/src/client/options.rs

use crate::utils::prelude::*;

/// Objet d'options d'un appel, calqué sur la convention du client distant :
/// `{ where?, data?, select?, include?, orderBy?, skip?, take? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryOptions {
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depuis un `json!({...})`. Les clés inconnues sont refusées.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| AppError::invalid(format!("Options d'appel invalides : {}", e)))
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn select(mut self, select: Value) -> Self {
        self.select = Some(select);
        self
    }

    pub fn include(mut self, include: Value) -> Self {
        self.include = Some(include);
        self
    }

    pub fn order_by(mut self, order_by: Value) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    /// Noms des clés renseignées, dans leur forme d'appel.
    pub fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.filter.is_some() {
            keys.push("where");
        }
        if self.data.is_some() {
            keys.push("data");
        }
        if self.select.is_some() {
            keys.push("select");
        }
        if self.include.is_some() {
            keys.push("include");
        }
        if self.order_by.is_some() {
            keys.push("orderBy");
        }
        if self.skip.is_some() {
            keys.push("skip");
        }
        if self.take.is_some() {
            keys.push("take");
        }
        keys
    }

    /// Refuse les clés qui n'ont pas de sens pour l'opération.
    pub fn ensure_only(&self, operation: &str, allowed: &[&str]) -> Result<()> {
        match self.present_keys().into_iter().find(|k| !allowed.contains(k)) {
            Some(key) => Err(AppError::invalid(format!(
                "Option '{}' non supportée par {}",
                key, operation
            ))),
            None => Ok(()),
        }
    }

    /// `data` obligatoire et objet.
    pub fn data_object(&self, operation: &str) -> Result<Map<String, Value>> {
        match &self.data {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(AppError::invalid(format!(
                "{} : 'data' doit être un objet, reçu : {}",
                operation, other
            ))),
            None => Err(AppError::invalid(format!("{} : 'data' est requis", operation))),
        }
    }

    /// `where` obligatoire.
    pub fn require_filter(&self, operation: &str) -> Result<&Value> {
        self.filter
            .as_ref()
            .ok_or_else(|| AppError::invalid(format!("{} : 'where' est requis", operation)))
    }
}
