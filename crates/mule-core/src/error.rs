use thiserror::Error;

#[derive(Debug, Error)]
pub enum MuleError {
    #[error("right script not found: {0}")]
    RightScriptNotFound(String),

    #[error("unknown executable_type ({0}): expected one of auto, right_script_name, right_script_href, recipe_name")]
    UnknownExecutableType(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("resource {href} has no '{rel}' link")]
    MissingLink { href: String, rel: String },

    #[error("API request to {url} failed with HTTP {status}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MuleError {
    /// True for the "invalid configuration" family: problems detected before
    /// any request is sent.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MuleError::UnknownExecutableType(_) | MuleError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MuleError>;
