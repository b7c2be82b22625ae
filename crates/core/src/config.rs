use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub index: IndexConfig,
    pub documents: DocumentsConfig,
    pub summary: SummaryConfig,
    pub keywords: KeywordConfig,
    pub language: LanguageConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub path: String,
    pub on_missing: MissingIndexPolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: ".textsift/index".to_string(),
            on_missing: MissingIndexPolicy::default(),
        }
    }
}

/// What an incremental run does when no index exists yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIndexPolicy {
    #[default]
    Fail,
    Rebuild,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub root: String,
    /// Glob patterns matched against full paths.
    pub exclude: Vec<String>,
    pub include_hidden: bool,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            exclude: Vec::new(),
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub sentences: usize,
    pub min_cut: f64,
    pub max_cut: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sentences: 3,
            min_cut: 0.1,
            max_cut: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub top_fraction: f64,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self { top_fraction: 1.0 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub stopwords_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Loads the TOML file at `path` (or the optional `config/default`), then
/// `TEXTSIFT__SECTION__KEY` environment overrides.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("TEXTSIFT")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
