use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::protocol::ServiceKind;

use crate::catalog::DEFAULT_CATALOG_URL;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub catalog_url: String,
    pub sort_addr: String,
    pub bookmark_addr: String,
    pub builder_addr: String,
    pub dice_addr: String,
    /// Upper bound on one worker round trip; unset or 0 waits forever.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            sort_addr: ServiceKind::Sort.default_addr(),
            bookmark_addr: ServiceKind::Bookmark.default_addr(),
            builder_addr: ServiceKind::SpellBuilder.default_addr(),
            dice_addr: ServiceKind::Dice.default_addr(),
            request_timeout_ms: None,
        }
    }
}

impl ClientSettings {
    pub fn worker_addr(&self, service: ServiceKind) -> &str {
        match service {
            ServiceKind::Sort => &self.sort_addr,
            ServiceKind::Bookmark => &self.bookmark_addr,
            ServiceKind::SpellBuilder => &self.builder_addr,
            ServiceKind::Dice => &self.dice_addr,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "catalog_url" => self.catalog_url = value,
            "sort_addr" => self.sort_addr = value,
            "bookmark_addr" => self.bookmark_addr = value,
            "builder_addr" => self.builder_addr = value,
            "dice_addr" => self.dice_addr = value,
            "request_timeout_ms" => {
                self.request_timeout_ms = Some(
                    value
                        .trim()
                        .parse()
                        .with_context(|| format!("'{value}' is not a number of milliseconds"))?,
                )
            }
            _ => {}
        }
        Ok(())
    }
}

const ENV_KEYS: [(&str, &str); 6] = [
    ("SPELLBOOK_CATALOG_URL", "catalog_url"),
    ("SPELLBOOK_SORT_ADDR", "sort_addr"),
    ("SPELLBOOK_BOOKMARK_ADDR", "bookmark_addr"),
    ("SPELLBOOK_BUILDER_ADDR", "builder_addr"),
    ("SPELLBOOK_DICE_ADDR", "dice_addr"),
    ("SPELLBOOK_REQUEST_TIMEOUT_MS", "request_timeout_ms"),
];

/// Defaults, then `path` if it exists, then `SPELLBOOK_*` variables.
pub fn load_settings(path: &Path) -> Result<ClientSettings> {
    let mut settings = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read client config '{}'", path.display()))?;
        toml::from_str::<ClientSettings>(&raw)
            .with_context(|| format!("invalid client config '{}'", path.display()))?
    } else {
        ClientSettings::default()
    };

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    for (env_key, key) in ENV_KEYS {
        if let Some(value) = lookup(env_key) {
            settings
                .set(key, value)
                .with_context(|| format!("invalid value in {env_key}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
