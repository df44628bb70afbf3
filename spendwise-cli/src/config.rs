use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spendwise_finance::oracle::direct::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use spendwise_finance::oracle::proxy::DEFAULT_PROXY_URL;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleSection,
    pub logging: LoggingSection,
}

/// How oracle requests leave the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// POST to the hosted llm-proxy function
    #[default]
    Proxy,
    /// Call the chat-completions API directly
    Direct,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSection {
    pub transport: Transport,
    pub proxy_url: String,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; the key itself is never stored.
    pub api_key_env: String,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            transport: Transport::Proxy,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// tracing-subscriber filter directive, used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Apply environment overrides. `env` returns a variable's value, if set.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(model) = first_env(&env, &["GROQ_MODEL", "VITE_OPENAI_MODEL"]) {
            self.oracle.model = model;
        }
        if let Some(base) = first_env(&env, &["GROQ_BASE_URL", "VITE_OPENAI_BASE_URL"]) {
            self.oracle.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(url) = first_env(&env, &["SPENDWISE_PROXY_URL"]) {
            self.oracle.proxy_url = url;
        }
    }

    /// API key from the configured variable, else `VITE_OPENAI_API_KEY`.
    pub fn api_key(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        first_env(&env, &[self.oracle.api_key_env.as_str(), "VITE_OPENAI_API_KEY"])
    }
}

fn first_env(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|&k| env(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub fn spendwise_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendwise"))
}

pub fn config_path() -> Result<PathBuf> {
    let dir = spendwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_partial_file_is_defaulted() {
        let cfg: Config = toml::from_str("[oracle]\ntransport = \"direct\"\n").unwrap();
        assert_eq!(cfg.oracle.transport, Transport::Direct);
        assert_eq!(cfg.oracle.model, DEFAULT_MODEL);
        assert_eq!(cfg.logging.filter, "info");

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty.oracle.transport, Transport::Proxy);
        assert_eq!(empty.oracle.proxy_url, DEFAULT_PROXY_URL);
    }

    #[test]
    fn test_env_overrides_and_fallbacks() {
        let mut cfg = Config::default();
        cfg.apply_env(env_of(&[
            ("VITE_OPENAI_MODEL", "mixtral"),
            ("GROQ_BASE_URL", "https://example.test/v1/"),
            ("SPENDWISE_PROXY_URL", "https://proxy.test/llm"),
        ]));
        assert_eq!(cfg.oracle.model, "mixtral");
        assert_eq!(cfg.oracle.base_url, "https://example.test/v1");
        assert_eq!(cfg.oracle.proxy_url, "https://proxy.test/llm");

        cfg.apply_env(env_of(&[("GROQ_MODEL", "llama"), ("VITE_OPENAI_MODEL", "mixtral")]));
        assert_eq!(cfg.oracle.model, "llama");
    }

    #[test]
    fn test_api_key_lookup() {
        let cfg = Config::default();
        assert_eq!(cfg.api_key(env_of(&[("GROQ_API_KEY", "gsk_1")])).as_deref(), Some("gsk_1"));
        assert_eq!(
            cfg.api_key(env_of(&[("GROQ_API_KEY", "  "), ("VITE_OPENAI_API_KEY", "sk_2")])).as_deref(),
            Some("sk_2")
        );
        assert_eq!(cfg.api_key(env_of(&[])), None);

        let mut custom = Config::default();
        custom.oracle.api_key_env = "MY_KEY".to_string();
        assert_eq!(custom.api_key(env_of(&[("MY_KEY", "k")])).as_deref(), Some("k"));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(s.contains("transport = \"proxy\""));
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.oracle.api_key_env, "GROQ_API_KEY");
    }
}
