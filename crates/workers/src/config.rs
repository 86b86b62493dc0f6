use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::ServiceKind;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerSettings {
    pub sort_addr: String,
    pub bookmark_addr: String,
    pub builder_addr: String,
    pub dice_addr: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            sort_addr: ServiceKind::Sort.default_addr(),
            bookmark_addr: ServiceKind::Bookmark.default_addr(),
            builder_addr: ServiceKind::SpellBuilder.default_addr(),
            dice_addr: ServiceKind::Dice.default_addr(),
        }
    }
}

impl WorkerSettings {
    pub fn bind_addr(&self, service: ServiceKind) -> &str {
        match service {
            ServiceKind::Sort => &self.sort_addr,
            ServiceKind::Bookmark => &self.bookmark_addr,
            ServiceKind::SpellBuilder => &self.builder_addr,
            ServiceKind::Dice => &self.dice_addr,
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "sort_addr" => self.sort_addr = value,
            "bookmark_addr" => self.bookmark_addr = value,
            "builder_addr" => self.builder_addr = value,
            "dice_addr" => self.dice_addr = value,
            _ => {}
        }
    }
}

const ENV_KEYS: [(&str, &str); 4] = [
    ("SPELLBOOK_SORT_ADDR", "sort_addr"),
    ("SPELLBOOK_BOOKMARK_ADDR", "bookmark_addr"),
    ("SPELLBOOK_BUILDER_ADDR", "builder_addr"),
    ("SPELLBOOK_DICE_ADDR", "dice_addr"),
];

/// Defaults, then `path` if it exists, then `SPELLBOOK_*_ADDR` variables.
pub fn load_settings(path: &Path) -> anyhow::Result<WorkerSettings> {
    let mut settings = WorkerSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read worker config '{}'", path.display()))?;
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("invalid worker config '{}'", path.display()))?;
        for (key, value) in file_cfg {
            settings.set(&key, value);
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_env(settings: &mut WorkerSettings, lookup: impl Fn(&str) -> Option<String>) {
    for (env_key, key) in ENV_KEYS {
        if let Some(value) = lookup(env_key) {
            settings.set(key, value);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
