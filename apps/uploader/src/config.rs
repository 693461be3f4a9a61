use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
        }
    }
}

/// Defaults, overridden by `uploader.toml` in the working directory,
/// overridden by environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("uploader.toml") {
        merge_file_values(&mut settings, &raw);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn merge_file_values(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["UPLOAD_SERVER_URL", "APP__SERVER_URL"] {
        if let Some(v) = var(key) {
            settings.server_url = v;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
