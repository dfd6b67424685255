use crate::error::{Result, TrackerError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Which backend the application talks to. The embedded SQLite file is
/// the development default; Supabase is the hosted mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
}

fn default_backend() -> Backend {
    Backend::Local
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "data/election_data.db".to_string()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseConfig {
    /// Full project URL (e.g. https://xyzcompany.supabase.co). May be
    /// omitted in the file and supplied via SUPABASE_URL or derived
    /// from SUPABASE_PROJECT_REF.
    pub url: Option<String>,
}

impl Config {
    /// Loads `config.toml` from the working directory. A missing file
    /// yields the defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config {
                backend: default_backend(),
                local: LocalConfig::default(),
                supabase: SupabaseConfig::default(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolves the Supabase project URL: config file first, then
    /// SUPABASE_URL, then SUPABASE_PROJECT_REF.
    pub fn supabase_url(&self) -> Result<String> {
        if let Some(url) = &self.supabase.url {
            return Ok(url.clone());
        }
        if let Ok(url) = env::var("SUPABASE_URL") {
            return Ok(url);
        }
        if let Ok(project_ref) = env::var("SUPABASE_PROJECT_REF") {
            return Ok(format!("https://{project_ref}.supabase.co"));
        }
        Err(TrackerError::Config(
            "supabase backend selected but no supabase.url, SUPABASE_URL or SUPABASE_PROJECT_REF set".to_string(),
        ))
    }

    /// The anon key is credential material and only ever read from the
    /// environment, never from the config file.
    pub fn supabase_anon_key(&self) -> Result<String> {
        env::var("SUPABASE_ANON_KEY")
            .map_err(|_| TrackerError::Config("SUPABASE_ANON_KEY environment variable not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.local.db_path, "data/election_data.db");
    }

    #[test]
    fn backend_and_paths_parse_from_toml() {
        let config: Config = toml::from_str(
            r#"
            backend = "supabase"

            [local]
            db_path = "fixtures/test.db"

            [supabase]
            url = "https://example.supabase.co"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Supabase);
        assert_eq!(config.local.db_path, "fixtures/test.db");
        assert_eq!(config.supabase_url().unwrap(), "https://example.supabase.co");
    }
}
