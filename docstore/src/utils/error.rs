// FICHIER : docstore/src/utils/error.rs

use std::path::{Path, PathBuf};

// --- RE-EXPORTS ANYHOW (Pour la flexibilité du CLI) ---
pub use anyhow::{anyhow, Context};
pub use anyhow::Result as AnyResult;

// --- GESTION D'ERREUR STRICTE ---

/// Type de résultat standard du magasin documentaire.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs.
/// Aucune de ces erreurs n'est rejouée dans la couche : la politique de retry
/// appartient à l'appelant.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `update` / `delete` ciblent une clé sans correspondance.
    #[error("Introuvable : aucun document de '{collection}' ne correspond à {key}")]
    NotFound { collection: String, key: String },

    /// La boucle génération-vérification de clé naturelle a épuisé son budget.
    #[error(
        "Génération de clé épuisée : '{field}' toujours en collision après {attempts} tentatives"
    )]
    KeyGenerationExhausted { field: String, attempts: usize },

    /// Lecture/écriture disque impossible, ou fichier de collection corrompu.
    #[error("Stockage indisponible ({}) : {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Opérateur de filtre non supporté : '{operator}' sur le champ '{field}'")]
    UnsupportedFilter { field: String, operator: String },

    #[error("Entrée invalide : {0}")]
    InvalidInput(String),

    #[error("Erreur de configuration : {0}")]
    Config(String),

    /// Échec remonté par un client distant.
    #[error("Erreur du backend : {0}")]
    Backend(String),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),
}

impl AppError {
    pub fn storage(path: &Path, reason: impl std::fmt::Display) -> Self {
        AppError::StorageUnavailable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(collection: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }

    pub fn unsupported(field: &str, operator: &str) -> Self {
        AppError::UnsupportedFilter {
            field: field.to_string(),
            operator: operator.to_string(),
        }
    }

    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidInput(msg.into())
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}
