//! Service API key handling: env var first, then the in-memory session
//! copy, then the OS keyring. The in-memory copy lets the current session
//! keep working even when the keyring fails to persist.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use serde::Serialize;

const KEYRING_SERVICE: &str = "lingua";
const KEYRING_USER: &str = "service_api_key";
const API_KEY_ENV: &str = "LINGUA_API_KEY";

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub source: String, // env|keyring
    pub reason: Option<String>,
}

static MEMORY: Mutex<Option<String>> = Mutex::new(None);

fn load_from_memory() -> Option<String> {
    let g = MEMORY.lock().ok()?;
    g.as_ref().cloned().filter(|s| !s.trim().is_empty())
}

fn set_memory(key: Option<&str>) {
    if let Ok(mut g) = MEMORY.lock() {
        *g = key.map(str::to_string).filter(|s| !s.trim().is_empty());
    }
}

pub fn load_api_key() -> Result<String> {
    if let Ok(k) = std::env::var(API_KEY_ENV) {
        if !k.trim().is_empty() {
            return Ok(k);
        }
    }

    if let Some(k) = load_from_memory() {
        return Ok(k);
    }

    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| anyhow!("keyring entry init failed: {e:?}"))?;
    let k = entry
        .get_password()
        .map_err(|e| anyhow!("keyring get failed: {e:?}"))?;
    if k.trim().is_empty() {
        return Err(anyhow!("empty api key"));
    }
    Ok(k)
}

pub fn set_api_key(key: &str) -> Result<()> {
    set_memory(Some(key));

    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| anyhow!("keyring entry init failed: {e:?}"))?;
    entry
        .set_password(key)
        .map_err(|e| anyhow!("keyring set failed: {e:?}"))?;
    Ok(())
}

pub fn clear_api_key() -> Result<()> {
    set_memory(None);

    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| anyhow!("keyring entry init failed: {e:?}"))?;
    entry
        .delete_credential()
        .map_err(|e| anyhow!("keyring delete failed: {e:?}"))?;
    Ok(())
}

pub fn api_key_status() -> ApiKeyStatus {
    if let Ok(k) = std::env::var(API_KEY_ENV) {
        if !k.trim().is_empty() {
            return ApiKeyStatus {
                configured: true,
                source: "env".to_string(),
                reason: None,
            };
        }
    }
    if load_from_memory().is_some() {
        return ApiKeyStatus {
            configured: true,
            source: "memory".to_string(),
            reason: None,
        };
    }
    let entry = match keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        Ok(v) => v,
        Err(e) => {
            return ApiKeyStatus {
                configured: false,
                source: "keyring".to_string(),
                reason: Some(format!("keyring_entry_init_failed:{e:?}")),
            };
        }
    };
    match entry.get_password() {
        Ok(k) if !k.trim().is_empty() => ApiKeyStatus {
            configured: true,
            source: "keyring".to_string(),
            reason: None,
        },
        Ok(_) => ApiKeyStatus {
            configured: false,
            source: "keyring".to_string(),
            reason: Some("empty".to_string()),
        },
        Err(e) => ApiKeyStatus {
            configured: false,
            source: "keyring".to_string(),
            reason: Some(format!("keyring_get_failed:{e:?}")),
        },
    }
}
