//! Configuration management for the chat Lambda.

use std::env;
use std::str::FromStr;

use crate::{Error, Result};

/// Where the knowledge document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// Fetched from the deployed site, cached for the staleness window.
    Remote,
    /// Compiled into the binary.
    Embedded,
}

impl FromStr for KnowledgeSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remote" => Ok(KnowledgeSource::Remote),
            "embedded" => Ok(KnowledgeSource::Embedded),
            other => Err(Error::Config(format!(
                "Invalid KNOWLEDGE_SOURCE '{}' (expected 'remote' or 'embedded')",
                other
            ))),
        }
    }
}

/// What the handler returns when the model invocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 200 with a canned reply; the diagnostic rides along in `error`.
    MaskAs200,
    /// 500 with the error only.
    SurfaceAs500,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mask" => Ok(FailurePolicy::MaskAs200),
            "surface" => Ok(FailurePolicy::SurfaceAs500),
            other => Err(Error::Config(format!(
                "Invalid UPSTREAM_FAILURE '{}' (expected 'mask' or 'surface')",
                other
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key
    pub gemini_api_key: String,
    /// Shared secret for the x-access-token guard; the guard is active when set
    pub access_token: Option<String>,
    /// Knowledge document source
    pub knowledge_source: KnowledgeSource,
    /// Behavior on model-invocation failure
    pub failure_policy: FailurePolicy,
    /// Deployed site base URL (production knowledge fetches)
    pub site_url: Option<String>,
    /// Development mode selects the local knowledge URL
    pub dev_mode: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A missing API key is a startup failure, not a per-request one.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let knowledge_source = match env::var("KNOWLEDGE_SOURCE") {
            Ok(value) => value.parse()?,
            Err(_) => KnowledgeSource::Remote,
        };

        let failure_policy = match env::var("UPSTREAM_FAILURE") {
            Ok(value) => value.parse()?,
            Err(_) => FailurePolicy::MaskAs200,
        };

        let dev_mode = env::var("ENVIRONMENT")
            .map(|v| v == "development")
            .unwrap_or(false);

        let site_url = env::var("SITE_URL").ok();
        if knowledge_source == KnowledgeSource::Remote && !dev_mode && site_url.is_none() {
            return Err(Error::Config(
                "SITE_URL not set (required for the remote knowledge source)".to_string(),
            ));
        }

        Ok(Self {
            gemini_api_key,
            access_token: env::var("API_ACCESS_TOKEN").ok(),
            knowledge_source,
            failure_policy,
            site_url,
            dev_mode,
        })
    }

    /// URL of the knowledge document for the remote source.
    pub fn knowledge_base_url(&self) -> String {
        if self.dev_mode {
            "http://localhost:8888/knowledge-base.txt".to_string()
        } else {
            let base = self.site_url.as_deref().unwrap_or_default();
            format!("{}/knowledge-base.txt", base.trim_end_matches('/'))
        }
    }
}
