use std::path::PathBuf;
use std::time::Duration;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{LibrarianError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub chat_temperature: f32,
    pub embedding_model: String,
    pub chroma_url: String,
    pub collection_name: String,
    pub knowledge_path: PathBuf,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Environment (and `.env`) over `librarian.toml` over defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::with_name("librarian").required(false))
            .add_source(Environment::default().try_parsing(true));
        Self::from_builder(builder)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(source, FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(::config::Config::builder()
            .set_default("port", 8080_i64)?
            .set_default("openai_base_url", "https://api.openai.com/v1")?
            .set_default("chat_model", "gpt-4o-mini")?
            .set_default("chat_temperature", 0.2_f64)?
            .set_default("embedding_model", "text-embedding-3-small")?
            .set_default("chroma_url", "http://localhost:8000")?
            .set_default("collection_name", "books_rag")?
            .set_default("knowledge_path", "data/book_summaries.json")?
            .set_default("default_top_k", 5_i64)?
            .set_default("max_top_k", 20_i64)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("log_level", "info")?
            .set_default("log_format", "json")?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key().is_none() {
            return Err(LibrarianError::Configuration(
                "OPENAI_API_KEY must be set".to_string(),
            ));
        }
        for (name, value) in [
            ("OPENAI_BASE_URL", &self.openai_base_url),
            ("CHROMA_URL", &self.chroma_url),
            ("COLLECTION_NAME", &self.collection_name),
            ("CHAT_MODEL", &self.chat_model),
            ("EMBEDDING_MODEL", &self.embedding_model),
        ] {
            if value.trim().is_empty() {
                return Err(LibrarianError::Configuration(format!("{} must not be empty", name)));
            }
        }
        if self.max_top_k == 0 {
            return Err(LibrarianError::Configuration("MAX_TOP_K must be positive".to_string()));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(LibrarianError::Configuration(format!(
                "DEFAULT_TOP_K must be between 1 and {}",
                self.max_top_k
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(LibrarianError::Configuration(
                "REQUEST_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.chat_temperature) {
            return Err(LibrarianError::Configuration(
                "CHAT_TEMPERATURE must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_json(&self) -> bool {
        !self.log_format.eq_ignore_ascii_case("pretty")
    }

    /// Resolve a caller-supplied k against the configured bounds.
    pub fn top_k(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            None => Ok(self.default_top_k),
            Some(k) if k == 0 || k > self.max_top_k => Err(LibrarianError::BadRequest(format!(
                "top_k must be between 1 and {}",
                self.max_top_k
            ))),
            Some(k) => Ok(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_key() {
        let config = Config::from_toml(r#"openai_api_key = "sk-test""#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.collection_name, "books_rag");
        assert_eq!(config.default_top_k, 5);
        assert_eq!(config.max_top_k, 20);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.log_json());
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = Config::from_toml("port = 9000").unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));

        let err = Config::from_toml(r#"openai_api_key = "   ""#).unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));
    }

    #[test]
    fn default_top_k_must_fit_under_max() {
        let err = Config::from_toml(
            r#"
            openai_api_key = "sk-test"
            default_top_k = 30
            max_top_k = 20
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_toml(
            r#"
            openai_api_key = "sk-test"
            request_timeout_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));
    }

    #[test]
    fn top_k_resolution() {
        let config = Config::from_toml(
            r#"
            openai_api_key = "sk-test"
            default_top_k = 3
            max_top_k = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.top_k(None).unwrap(), 3);
        assert_eq!(config.top_k(Some(10)).unwrap(), 10);
        assert!(matches!(config.top_k(Some(0)), Err(LibrarianError::BadRequest(_))));
        assert!(matches!(config.top_k(Some(11)), Err(LibrarianError::BadRequest(_))));
    }

    #[test]
    fn pretty_log_format() {
        let config = Config::from_toml(
            r#"
            openai_api_key = "sk-test"
            log_format = "Pretty"
            "#,
        )
        .unwrap();
        assert!(!config.log_json());
    }
}
