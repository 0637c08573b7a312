// FICHIER : docstore/src/json_db/ids.rs

//! Identifiants internes opaques et génération de clés naturelles.
//!
//! L'unicité des clés naturelles (`userId`, `couponId`, ...) n'est PAS garantie par le moteur :
//! l'appelant génère un candidat, vérifie son absence, et recommence dans la limite d'un budget.

use crate::utils::prelude::*;
use chrono::Utc;
use rand::Rng;
use std::future::Future;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 8;

pub const DEFAULT_KEY_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

fn random_from(alphabet: &[char], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}

/// `c` + horodatage milliseconde en base 36 + 8 caractères aléatoires.
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let alphabet: Vec<char> = BASE36.iter().map(|b| char::from(*b)).collect();
    format!("c{}{}", to_base36(millis), random_from(&alphabet, ID_RANDOM_LEN))
}

/// Forme des clés naturelles générées.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPolicy {
    pub length: usize,
    pub alphabet: String,
    pub max_attempts: usize,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            length: 8,
            alphabet: DEFAULT_KEY_ALPHABET.to_string(),
            max_attempts: 10,
        }
    }
}

pub fn random_key(policy: &KeyPolicy) -> Result<String> {
    let alphabet: Vec<char> = policy.alphabet.chars().collect();
    if alphabet.is_empty() || policy.length == 0 {
        return Err(AppError::invalid(
            "KeyPolicy : alphabet et longueur doivent être non vides",
        ));
    }
    Ok(random_from(&alphabet, policy.length))
}

/// Boucle générer-vérifier. `exists` interroge le backend actif (typiquement `find_unique`).
pub async fn generate_unique_key<F, Fut>(
    field: &str,
    policy: &KeyPolicy,
    mut exists: F,
) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=policy.max_attempts {
        let candidate = random_key(policy)?;
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        debug!(field, attempt, "Collision de clé naturelle, nouvel essai");
    }
    warn!(field, attempts = policy.max_attempts, "⚠️ Budget de génération de clé épuisé");
    Err(AppError::KeyGenerationExhausted {
        field: field.to_string(),
        attempts: policy.max_attempts,
    })
}
