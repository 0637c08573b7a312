// FICHIER : docstore/src/json_db/storage/mod.rs

pub mod file_storage;
pub mod legacy;
pub mod lock_manager;

use crate::json_db::collections::Document;
use crate::utils::fs::{self, PathBuf};
use crate::utils::prelude::*;
use lock_manager::LockManager;
use std::collections::BTreeMap;

pub const COLLECTION_EXTENSION: &str = "json";

// --- CONFIGURATION ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonDbConfig {
    pub data_root: PathBuf,
    /// Champs admis au premier niveau d'une enveloppe héritée, par collection.
    #[serde(default)]
    pub envelope_keys: BTreeMap<String, Vec<String>>,
}

impl JsonDbConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            envelope_keys: BTreeMap::new(),
        }
    }

    /// Fusionne des clés d'enveloppe (sans doublon) avec celles déjà connues.
    pub fn with_envelope_keys(mut self, keys: BTreeMap<String, Vec<String>>) -> Self {
        for (collection, fields) in keys {
            let known = self.envelope_keys.entry(collection).or_default();
            for field in fields {
                if !known.contains(&field) {
                    known.push(field);
                }
            }
        }
        self
    }

    pub fn envelope_keys_for(&self, collection: &str) -> &[String] {
        self.envelope_keys
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn from_app(config: &AppConfig) -> Self {
        Self::new(config.data_root.clone())
    }

    /// `<data_root>/<collection>.json`
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        validate_collection_name(collection)?;
        Ok(self
            .data_root
            .join(format!("{}.{}", collection, COLLECTION_EXTENSION)))
    }
}

/// Un nom de collection devient un nom de fichier : ni séparateur, ni fichier caché,
/// ni préfixe `_` (réservé aux dossiers internes comme `_logs`).
pub fn validate_collection_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name.starts_with('.')
        || name.starts_with('_')
        || name
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());
    if bad {
        return Err(AppError::invalid(format!(
            "Nom de collection invalide : '{}'",
            name
        )));
    }
    Ok(())
}

// --- MOTEUR DE STOCKAGE ---

/// Un fichier par collection, réécrit en entier à chaque mutation.
/// Les mutations tiennent le verrou d'écriture de la collection pendant
/// lecture-modification-écriture.
#[derive(Debug, Clone)]
pub struct StorageEngine {
    pub config: JsonDbConfig,
    locks: &'static LockManager,
}

impl StorageEngine {
    pub fn new(config: JsonDbConfig) -> Self {
        Self {
            config,
            locks: LockManager::global(),
        }
    }

    fn lock_for(
        &self,
        collection: &str,
    ) -> Result<(PathBuf, std::sync::Arc<tokio::sync::RwLock<()>>)> {
        let path = self.config.collection_path(collection)?;
        let lock = self.locks.collection_lock(&path.to_string_lossy());
        Ok((path, lock))
    }

    /// Charge tous les documents, enveloppes héritées aplaties.
    pub async fn load(&self, collection: &str) -> Result<Vec<Document>> {
        let (path, lock) = self.lock_for(collection)?;
        let _guard = lock.read().await;
        let raw = file_storage::read_raw(&path).await?;
        let keys = self.config.envelope_keys_for(collection);
        Ok(raw
            .into_iter()
            .map(|d| Document::from_map(legacy::normalize(d, keys)))
            .collect())
    }

    /// Charge la collection telle qu'elle est sur disque (sans normalisation).
    pub async fn load_raw(&self, collection: &str) -> Result<Vec<Map<String, Value>>> {
        let (path, lock) = self.lock_for(collection)?;
        let _guard = lock.read().await;
        file_storage::read_raw(&path).await
    }

    /// Remplace le contenu de la collection.
    pub async fn store(&self, collection: &str, docs: &[Document]) -> Result<()> {
        let (path, lock) = self.lock_for(collection)?;
        let _guard = lock.write().await;
        file_storage::write_all(&path, docs).await
    }

    /// Lecture-modification-écriture atomique vis-à-vis des autres mutations du processus.
    /// Si `f` échoue, le fichier n'est pas touché.
    pub async fn mutate<T, F>(&self, collection: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Document>) -> Result<T>,
    {
        let (path, lock) = self.lock_for(collection)?;
        let _guard = lock.write().await;

        let keys = self.config.envelope_keys_for(collection);
        let mut docs: Vec<Document> = file_storage::read_raw(&path)
            .await?
            .into_iter()
            .map(|d| Document::from_map(legacy::normalize(d, keys)))
            .collect();

        let out = f(&mut docs)?;
        file_storage::write_all(&path, &docs).await?;
        Ok(out)
    }

    /// Réécrit la collection au format plat. Retourne le nombre d'enveloppes converties.
    pub async fn flatten(&self, collection: &str) -> Result<usize> {
        let (path, lock) = self.lock_for(collection)?;
        let _guard = lock.write().await;

        let raw = file_storage::read_raw(&path).await?;
        let keys = self.config.envelope_keys_for(collection);
        let converted = raw
            .iter()
            .filter(|d| legacy::is_legacy_envelope(d, keys))
            .count();
        if converted == 0 {
            return Ok(0);
        }
        let flat: Vec<Map<String, Value>> = raw
            .into_iter()
            .map(|d| legacy::normalize(d, keys))
            .collect();
        file_storage::write_raw(&path, &flat).await?;
        Ok(converted)
    }

    /// Collections présentes sur disque (ordre alphabétique).
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let stems = fs::list_stems(&self.config.data_root, COLLECTION_EXTENSION).await?;
        Ok(stems
            .into_iter()
            .filter(|s| validate_collection_name(s).is_ok())
            .collect())
    }
}
