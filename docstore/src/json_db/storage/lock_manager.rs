use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::RwLock;

static GLOBAL: OnceLock<LockManager> = OnceLock::new();

/// Gestionnaire de verrous simple (granularité : Collection)
/// Un seul écrivain par collection, les lecteurs attendent derrière lui.
#[derive(Debug, Default, Clone)]
pub struct LockManager {
    // Clé = chemin du fichier de collection
    locks: Arc<Mutex<HashMap<String, Arc<RwLock<()>>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance partagée par tout le processus : deux moteurs ouverts sur la même racine
    /// se synchronisent sur les mêmes verrous.
    pub fn global() -> &'static LockManager {
        GLOBAL.get_or_init(LockManager::new)
    }

    /// Récupère le verrou d'une collection (créé à la demande)
    pub fn collection_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let mut map = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}
