// FICHIER : docstore/src/json_db/mod.rs

//! Magasin documentaire JSON : un fichier par collection, requêtes par balayage.

pub mod collections;
pub mod ids;
pub mod migrations;
pub mod query;
pub mod relations;
pub mod storage;

pub use collections::Document;
pub use storage::{JsonDbConfig, StorageEngine};
