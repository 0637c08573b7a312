// FICHIER : docstore/src/utils/config.rs

use crate::utils::env;
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Singleton global pour la configuration (résolue une seule fois au démarrage)
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub const ENV_USE_LOCAL_DB: &str = "DOCSTORE_USE_LOCAL_DB";
pub const ENV_DATA_ROOT: &str = "DOCSTORE_DATA_ROOT";
pub const ENV_LOG_LEVEL: &str = "DOCSTORE_LOG_LEVEL";

pub const DEFAULT_DATA_ROOT: &str = "./data";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Sélection du backend : un seul interrupteur pour tout le processus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Fichiers JSON locaux (ce moteur)
    Local,
    /// Client de base documentaire distant fourni par l'application
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub use_local_db: bool,
    pub data_root: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_local_db: true,
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Lit `.env` puis l'environnement, et fige le résultat pour le reste du processus.
    /// Un second appel est sans effet.
    pub fn init() -> Result<&'static AppConfig> {
        if let Some(cfg) = CONFIG.get() {
            return Ok(cfg);
        }
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        Ok(Self::install(config))
    }

    /// Installe une configuration explicite (CLI avec `--root`, tests).
    /// Si une configuration est déjà active, c'est elle qui est retournée.
    pub fn install(config: AppConfig) -> &'static AppConfig {
        let active = CONFIG.get_or_init(|| config.clone());
        if *active != config {
            tracing::warn!(
                "⚠️ [Config] Configuration déjà figée, la nouvelle valeur est ignorée ({:?})",
                config
            );
        }
        active
    }

    pub fn get() -> Result<&'static AppConfig> {
        CONFIG.get().ok_or_else(|| {
            AppError::Config(
                "AppConfig non initialisé ! Appelez AppConfig::init() au démarrage.".to_string(),
            )
        })
    }

    /// Construction pure depuis l'environnement (sans effet global).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            use_local_db: env::flag(ENV_USE_LOCAL_DB, true)?,
            data_root: PathBuf::from(env::get_or(ENV_DATA_ROOT, DEFAULT_DATA_ROOT)),
            log_level: env::get_or(ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL),
        })
    }

    pub fn backend_mode(&self) -> BackendMode {
        if self.use_local_db {
            BackendMode::Local
        } else {
            BackendMode::Remote
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_root.join("_logs")
    }
}
