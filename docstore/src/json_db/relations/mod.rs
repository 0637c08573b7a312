//! Relations entre collections (émulation des jointures)
//!
//! Deux styles de référence coexistent et ne doivent pas être confondus :
//! - `BelongsTo` : la clé naturelle du document courant est cherchée dans un champ de la cible ;
//! - `HasMany` : la cible stocke l'`id` interne du document courant comme clé étrangère.

use crate::json_db::query::parser::parse_select;
use crate::json_db::query::Projection;
use crate::utils::prelude::*;
use std::collections::HashMap;

pub mod resolver;

pub use resolver::RelationResolver;

/// Clé réservée du comptage (`include: { _count: { select: { rel: true } } }`)
pub const COUNT_KEY: &str = "_count";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RelationKind {
    /// `cible[foreign_field] == courant[local_field]`
    BelongsTo {
        local_field: String,
        foreign_field: String,
    },
    /// `cible[foreign_field] == courant.id`
    HasMany { foreign_field: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub target: String,
    pub kind: RelationKind,
}

/// Relations déclarées par collection. Le moteur reste agnostique du schéma :
/// c'est le catalogue applicatif qui les enregistre.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    relations: HashMap<String, Vec<Relation>>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collection: &str, relation: Relation) {
        let list = self.relations.entry(collection.to_string()).or_default();
        list.retain(|r| r.name != relation.name);
        list.push(relation);
    }

    pub fn belongs_to(
        mut self,
        collection: &str,
        name: &str,
        target: &str,
        local_field: &str,
        foreign_field: &str,
    ) -> Self {
        self.register(
            collection,
            Relation {
                name: name.to_string(),
                target: target.to_string(),
                kind: RelationKind::BelongsTo {
                    local_field: local_field.to_string(),
                    foreign_field: foreign_field.to_string(),
                },
            },
        );
        self
    }

    pub fn has_many(
        mut self,
        collection: &str,
        name: &str,
        target: &str,
        foreign_field: &str,
    ) -> Self {
        self.register(
            collection,
            Relation {
                name: name.to_string(),
                target: target.to_string(),
                kind: RelationKind::HasMany {
                    foreign_field: foreign_field.to_string(),
                },
            },
        );
        self
    }

    pub fn get(&self, collection: &str, name: &str) -> Option<&Relation> {
        self.for_collection(collection).iter().find(|r| r.name == name)
    }

    pub fn for_collection(&self, collection: &str) -> &[Relation] {
        self.relations.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }

    fn require(&self, collection: &str, name: &str) -> Result<&Relation> {
        self.get(collection, name).ok_or_else(|| {
            AppError::invalid(format!(
                "Relation inconnue '{}' sur la collection '{}'",
                name, collection
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncludeItem {
    /// Document lié (belongs-to) ou liste (has-many), attaché sous le nom de la relation.
    Attach {
        relation: Relation,
        select: Option<Projection>,
    },
    /// Compteurs has-many attachés sous `_count.<relation>`.
    Count { relations: Vec<Relation> },
}

impl IncludeItem {
    /// Clé ajoutée au document résultat.
    pub fn output_key(&self) -> &str {
        match self {
            IncludeItem::Attach { relation, .. } => &relation.name,
            IncludeItem::Count { .. } => COUNT_KEY,
        }
    }
}

/// `include` -> liste d'éléments à résoudre. Les relations inconnues sont refusées.
pub fn parse_include(
    collection: &str,
    value: &Value,
    registry: &RelationRegistry,
) -> Result<Vec<IncludeItem>> {
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => return Err(AppError::invalid(format!("'include' invalide : {}", other))),
    };

    let mut items = Vec::new();
    for (name, spec) in map {
        if name == COUNT_KEY {
            if let Some(item) = parse_count(collection, spec, registry)? {
                items.push(item);
            }
            continue;
        }

        let relation = registry.require(collection, name)?.clone();
        let select = match spec {
            Value::Bool(false) => continue,
            Value::Bool(true) => None,
            Value::Object(opts) => {
                for key in opts.keys() {
                    if key != "select" {
                        return Err(AppError::invalid(format!(
                            "Option '{}' non supportée dans include.{}",
                            key, name
                        )));
                    }
                }
                match opts.get("select") {
                    Some(sel) => parse_select(sel)?,
                    None => None,
                }
            }
            other => {
                return Err(AppError::invalid(format!(
                    "include.{} invalide : {}",
                    name, other
                )))
            }
        };
        items.push(IncludeItem::Attach { relation, select });
    }
    Ok(items)
}

fn parse_count(
    collection: &str,
    spec: &Value,
    registry: &RelationRegistry,
) -> Result<Option<IncludeItem>> {
    let relations: Vec<Relation> = match spec {
        Value::Bool(false) => return Ok(None),
        // Toutes les relations has-many de la collection
        Value::Bool(true) => registry
            .for_collection(collection)
            .iter()
            .filter(|r| matches!(r.kind, RelationKind::HasMany { .. }))
            .cloned()
            .collect(),
        Value::Object(opts) => {
            let select = opts.get("select").and_then(Value::as_object).ok_or_else(|| {
                AppError::invalid("'_count' attend { select: { relation: true } }")
            })?;
            let mut out = Vec::new();
            for (name, flag) in select {
                match flag {
                    Value::Bool(true) => {}
                    Value::Bool(false) => continue,
                    other => {
                        return Err(AppError::invalid(format!(
                            "_count.select.{} attend un booléen, reçu : {}",
                            name, other
                        )))
                    }
                }
                let relation = registry.require(collection, name)?;
                if !matches!(relation.kind, RelationKind::HasMany { .. }) {
                    return Err(AppError::invalid(format!(
                        "_count : '{}' n'est pas une relation has-many",
                        name
                    )));
                }
                out.push(relation.clone());
            }
            out
        }
        other => return Err(AppError::invalid(format!("'_count' invalide : {}", other))),
    };
    Ok(Some(IncludeItem::Count { relations }))
}
