// FICHIER : docstore/src/utils/fs.rs

use crate::utils::error::{AppError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

pub use std::path::{Path, PathBuf};

/// Lit un fichier texte. `Ok(None)` si le fichier n'existe pas.
#[instrument(skip(path), fields(path = ?path))]
pub async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::storage(path, e)),
    }
}

/// S'assure qu'un dossier existe (création récursive).
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| AppError::storage(path, e))
}

/// Écriture atomique sécurisée (write -> sync -> rename)
#[instrument(skip(content, path), fields(path = ?path))]
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent).await?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| AppError::storage(&tmp_path, e))?;
        file.write_all(content)
            .await
            .map_err(|e| AppError::storage(&tmp_path, e))?;
        // On force l'écriture physique avant le renommage
        file.sync_all()
            .await
            .map_err(|e| AppError::storage(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| AppError::storage(path, e))
}

/// Liste les noms de fichiers d'un dossier ayant l'extension donnée (triés).
/// Dossier absent => liste vide.
pub async fn list_stems(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(AppError::storage(dir, e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::storage(dir, e))?
    {
        let p = entry.path();
        if p.extension().and_then(|s| s.to_str()) == Some(extension) {
            if let Some(stem) = p.file_stem().and_then(|s| s.to_str()) {
                out.push(stem.to_string());
            }
        }
    }
    out.sort();
    Ok(out)
}
