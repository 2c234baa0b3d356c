//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.codepad/config.json`) and environment.
//! Every section has defaults, so an empty `{}` file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway (backend proxy) server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// External text-generation provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Bookmark storage.
    #[serde(default)]
    pub bookmarks: BookmarksConfig,

    /// Code explainer settings.
    #[serde(default)]
    pub explainer: ExplainerConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15151).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15151
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

impl GatewayConfig {
    /// Base URL clients use to reach the gateway (e.g. `http://127.0.0.1:15151`).
    /// Unspecified binds (`0.0.0.0`, `::`) are dialed on loopback; IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        let bind = self.bind.trim();
        let host = match bind.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) if ip.is_unspecified() => Ipv4Addr::LOCALHOST.to_string(),
            Ok(IpAddr::V6(ip)) if ip.is_unspecified() => format!("[{}]", Ipv6Addr::LOCALHOST),
            Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
            Ok(IpAddr::V4(ip)) => ip.to_string(),
            Err(_) => bind.trim_start_matches('[').trim_end_matches(']').to_string(),
        };
        // A bracketed bind like "[::1]" does not parse as an address; re-bracket it.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Generative-language provider endpoint, credential, and generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// API root without the model path (default Gemini v1beta).
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Model id used in `models/{model}:generateContent` (default "gemini-pro").
    #[serde(default = "default_provider_model")]
    pub model: String,

    /// API key sent as the `key` query parameter. Overridden by GEMINI_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_provider_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_provider_model() -> String {
    "gemini-pro".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            model: default_provider_model(),
            api_key: None,
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Bookmark file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarksConfig {
    /// Path of the bookmarks JSON file. Relative paths are resolved against the config file's parent.
    /// Default: `bookmarks.json` next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Code explainer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainerConfig {
    /// Simulated analysis delay in milliseconds (default 2000).
    #[serde(default = "default_explainer_delay_ms")]
    pub delay_ms: u64,
}

fn default_explainer_delay_ms() -> u64 {
    2000
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_explainer_delay_ms(),
        }
    }
}

/// Resolve the provider API key: env GEMINI_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .provider
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CODEPAD_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".codepad").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, CODEPAD_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used (for resolving the config directory).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Resolve the bookmarks file: `config.bookmarks.path` if set (relative paths resolved against the
/// config file's parent), otherwise `bookmarks.json` next to the config file.
pub fn resolve_bookmarks_path(config: &Config, config_path: &Path) -> PathBuf {
    let config_parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match &config.bookmarks.path {
        Some(p) if !p.as_os_str().is_empty() => {
            if p.is_absolute() {
                p.clone()
            } else {
                config_parent.join(p)
            }
        }
        _ => config_parent.join("bookmarks.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 15151);
        assert_eq!(g.bind, "127.0.0.1");
        assert_eq!(g.base_url(), "http://127.0.0.1:15151");
    }

    #[test]
    fn base_url_brackets_ipv6_and_dials_loopback_for_wildcards() {
        let mut g = GatewayConfig::default();
        for (bind, expected) in [
            ("::1", "http://[::1]:15151"),
            ("[::1]", "http://[::1]:15151"),
            ("0.0.0.0", "http://127.0.0.1:15151"),
            ("::", "http://[::1]:15151"),
            ("localhost", "http://localhost:15151"),
            (" 192.168.1.5 ", "http://192.168.1.5:15151"),
        ] {
            g.bind = bind.to_string();
            let url = g.base_url();
            assert_eq!(url, expected, "bind {:?}", bind);
            assert!(reqwest::Url::parse(&url).is_ok(), "{} should parse", url);
        }
    }

    #[test]
    fn empty_json_uses_generation_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.provider.temperature, 0.7);
        assert_eq!(config.provider.top_k, 40);
        assert_eq!(config.provider.top_p, 0.95);
        assert_eq!(config.provider.max_output_tokens, 2048);
        assert_eq!(config.explainer.delay_ms, 2000);
    }

    #[test]
    fn partial_provider_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"provider":{"model":"gemini-1.5-flash","topK":8}}"#).unwrap();
        assert_eq!(config.provider.model, "gemini-1.5-flash");
        assert_eq!(config.provider.top_k, 8);
        assert_eq!(config.provider.max_output_tokens, 2048);
        assert!(config.provider.base_url.starts_with("https://"));
    }

    #[test]
    fn config_api_key_is_trimmed() {
        let mut config = Config::default();
        config.provider.api_key = Some("  abc  ".to_string());
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert_eq!(resolve_api_key(&config).as_deref(), Some("abc"));
        }
        config.provider.api_key = Some("   ".to_string());
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert_eq!(resolve_api_key(&config), None);
        }
    }

    #[test]
    fn resolve_bookmarks_path_default() {
        let config = Config::default();
        let path = Path::new("/home/user/.codepad/config.json");
        assert_eq!(
            resolve_bookmarks_path(&config, path),
            PathBuf::from("/home/user/.codepad/bookmarks.json")
        );
    }

    #[test]
    fn resolve_bookmarks_path_override_relative() {
        let mut config = Config::default();
        config.bookmarks.path = Some(PathBuf::from("data/saved.json"));
        let path = Path::new("/home/user/.codepad/config.json");
        assert_eq!(
            resolve_bookmarks_path(&config, path),
            PathBuf::from("/home/user/.codepad/data/saved.json")
        );
    }

    #[test]
    fn resolve_bookmarks_path_override_absolute() {
        let mut config = Config::default();
        config.bookmarks.path = Some(PathBuf::from("/srv/bookmarks.json"));
        let path = Path::new("/home/user/.codepad/config.json");
        assert_eq!(
            resolve_bookmarks_path(&config, path),
            PathBuf::from("/srv/bookmarks.json")
        );
    }

    #[test]
    fn loopback_detection() {
        assert!(is_loopback_bind("127.0.0.1"));
        assert!(is_loopback_bind(" localhost "));
        assert!(!is_loopback_bind("0.0.0.0"));
    }
}
