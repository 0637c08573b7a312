use crate::utils::{AppError, Result};
use std::env;
use std::str::FromStr;

/// Récupère une variable d'environnement (Requis).
pub fn get(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| AppError::Config(format!("Variable d'environnement manquante : {}", key)))
}

/// Récupère une variable d'environnement (Optionnel).
pub fn get_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Récupère une variable d'environnement avec valeur par défaut.
pub fn get_or(key: &str, default: &str) -> String {
    get_optional(key).unwrap_or_else(|| default.to_string())
}

/// Récupère et parse une variable (ex: booléen, entier).
pub fn get_parsed<T: FromStr>(key: &str) -> Result<T> {
    let val = get(key)?;
    val.trim()
        .parse::<T>()
        .map_err(|_| AppError::Config(format!("Impossible de parser la variable : {}", key)))
}

/// Interprète un drapeau booléen ("true", "1", "yes", "on" / "false", "0", "no", "off").
/// Absent => `default`. Toute autre valeur est une erreur de configuration.
pub fn flag(key: &str, default: bool) -> Result<bool> {
    match get_optional(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(AppError::Config(format!(
                "Valeur booléenne invalide pour {} : '{}'",
                key, other
            ))),
        },
    }
}

/// Indique si une feature flag est active.
pub fn is_enabled(key: &str) -> bool {
    flag(key, false).unwrap_or(false)
}
