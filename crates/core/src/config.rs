use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Repositories to harvest, in `owner/name` form, processed in order.
    pub repos: Vec<String>,
    pub github: GithubSection,
    pub qdrant: QdrantSection,
    pub embedding: EmbeddingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    pub api_url: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub lookback_days: u32,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            page_size: 50,
            lookback_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantSection {
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
}

impl Default for QdrantSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "pr-feedback".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    pub provider: String,
    pub dimension: usize,
    pub model: String,
    pub api_url: String,
    pub api_key: Option<String>,
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            dimension: 384,
            model: "text-embedding-3-small".to_string(),
            api_url: "https://api.openai.com".to_string(),
            api_key: None,
        }
    }
}

/// Loads configuration from an optional TOML file overlaid with
/// `FEEDBACK__`-prefixed environment variables. Every field has a default,
/// so a missing file still yields a usable config.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("FEEDBACK")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("repos"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
