// FICHIER : docstore/src/lib.rs

pub mod catalog;
pub mod client;
pub mod json_db;
pub mod utils;

pub use catalog::Catalog;
pub use client::{CollectionHandle, DbClient, DocumentBackend, LocalBackend, QueryOptions};
pub use json_db::ids::{new_id, KeyPolicy};
pub use json_db::{Document, JsonDbConfig, StorageEngine};
pub use utils::{init_logging, AppConfig, AppError, Result};
