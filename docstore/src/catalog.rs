// FICHIER : docstore/src/catalog.rs

//! Catalogue applicatif : collections connues, clés naturelles, relations et champs date.

use crate::json_db::relations::RelationRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    /// Identifiant métier unique (vérifié par l'appelant, jamais par le moteur)
    pub natural_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: Vec<CollectionSpec>,
    relations: RelationRegistry,
    date_fields: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(mut self, name: &str, natural_key: Option<&str>) -> Self {
        self.collections.retain(|c| c.name != name);
        self.collections.push(CollectionSpec {
            name: name.to_string(),
            natural_key: natural_key.map(str::to_string),
        });
        self
    }

    pub fn relations(mut self, relations: RelationRegistry) -> Self {
        self.relations = relations;
        self
    }

    pub fn date_fields(mut self, fields: &[&str]) -> Self {
        self.date_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Collections de l'application d'apprentissage de vocabulaire.
    pub fn standard() -> Self {
        Self::new()
            .collection("User", Some("userId"))
            .collection("Student", Some("userId"))
            .collection("Vocabulary", Some("vocabularyId"))
            .collection("Word", None)
            .collection("Coupon", Some("couponId"))
            .relations(
                RelationRegistry::new()
                    .belongs_to("Student", "user", "User", "userId", "userId")
                    .belongs_to("User", "student", "Student", "userId", "userId")
                    .has_many("Vocabulary", "words", "Word", "vocabularyId"),
            )
            .date_fields(&["period", "createdAt", "updatedAt", "birthday"])
    }

    pub fn collections(&self) -> &[CollectionSpec] {
        &self.collections
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name.clone()).collect()
    }

    pub fn natural_key(&self, collection: &str) -> Option<&str> {
        self.collections
            .iter()
            .find(|c| c.name == collection)
            .and_then(|c| c.natural_key.as_deref())
    }

    /// Clés naturelles tolérées à côté de `data` dans une enveloppe héritée.
    pub fn envelope_keys(&self) -> BTreeMap<String, Vec<String>> {
        self.collections
            .iter()
            .filter_map(|c| {
                c.natural_key
                    .as_ref()
                    .map(|k| (c.name.clone(), vec![k.clone()]))
            })
            .collect()
    }

    pub fn relation_registry(&self) -> &RelationRegistry {
        &self.relations
    }

    pub fn date_field_names(&self) -> &[String] {
        &self.date_fields
    }
}
