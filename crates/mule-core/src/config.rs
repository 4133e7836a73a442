use crate::error::{MuleError, Result};
use crate::types::{ExecutableType, Inputs, Revision, TagMatchStrategy, UpdateTargets};
use serde::Deserialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// Options for a single dispatch. Defaults: auto classification, latest
/// revision, match all tags, no inputs, no input propagation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub executable_type: ExecutableType,
    pub revision: Revision,
    pub tag_match_strategy: TagMatchStrategy,
    pub inputs: Inputs,
    pub update_inputs: UpdateTargets,
}

impl RunOptions {
    pub fn with_executable_type(mut self, executable_type: ExecutableType) -> Self {
        self.executable_type = executable_type;
        self
    }

    pub fn with_revision(mut self, revision: impl Into<Revision>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_tag_match_strategy(mut self, strategy: TagMatchStrategy) -> Self {
        self.tag_match_strategy = strategy;
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn with_update_inputs(mut self, targets: impl Into<UpdateTargets>) -> Self {
        self.update_inputs = targets.into();
        self
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

pub const DEFAULT_API_URL: &str = "https://my.rightscale.com";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Credentials for the cloud management API, read from a YAML file or from
/// `key:value` pairs on the command line.
///
/// ```yaml
/// email: ops@example.com
/// password: hunter2
/// account_id: 12345
/// ```
///
/// A `refresh_token` may be given instead of `email`/`password`.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "de_account_id")]
    pub account_id: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Account ids are numeric in most auth files; accept both forms.
fn de_account_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Num(n) => n.to_string(),
        Raw::Str(s) => s,
    }))
}

/// How the client will authenticate, derived from a validated [`AuthConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod<'a> {
    Password {
        email: &'a str,
        password: &'a str,
        account_id: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
        account_id: &'a str,
    },
}

impl AuthConfig {
    /// Load credentials from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuthConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build credentials from `key:value` pairs (`email:foo@bar.baz password:pw account_id:1`).
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = AuthConfig {
            email: None,
            password: None,
            refresh_token: None,
            account_id: None,
            api_url: default_api_url(),
            timeout_secs: None,
        };
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once(':').ok_or_else(|| {
                MuleError::InvalidConfig(format!("expected key:value auth pair, got '{pair}'"))
            })?;
            let value = value.to_string();
            match key.trim() {
                "email" => config.email = Some(value),
                "password" => config.password = Some(value),
                "refresh_token" => config.refresh_token = Some(value),
                "account_id" => config.account_id = Some(value),
                "api_url" => config.api_url = value,
                "timeout_secs" => {
                    config.timeout_secs = Some(value.parse().map_err(|_| {
                        MuleError::InvalidConfig(format!("timeout_secs must be a number, got '{value}'"))
                    })?)
                }
                other => {
                    return Err(MuleError::InvalidConfig(format!(
                        "unknown auth parameter '{other}'"
                    )))
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.method().map(|_| ())
    }

    /// Password login wins when both forms are present.
    pub fn method(&self) -> Result<AuthMethod<'_>> {
        let account_id = self
            .account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| MuleError::InvalidConfig("auth parameters are missing account_id".into()))?;

        match (&self.email, &self.password, &self.refresh_token) {
            (Some(email), Some(password), _) => Ok(AuthMethod::Password {
                email,
                password,
                account_id,
            }),
            (_, _, Some(refresh_token)) => Ok(AuthMethod::RefreshToken {
                refresh_token,
                account_id,
            }),
            _ => Err(MuleError::InvalidConfig(
                "auth parameters need either email and password, or refresh_token".into(),
            )),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateTarget;
    use tempfile::TempDir;

    #[test]
    fn run_options_defaults() {
        let opts = RunOptions::default();
        assert_eq!(opts.executable_type, ExecutableType::Auto);
        assert_eq!(opts.revision, Revision::Latest);
        assert_eq!(opts.tag_match_strategy, TagMatchStrategy::All);
        assert!(opts.inputs.is_empty());
        assert!(opts.update_inputs.is_empty());
    }

    #[test]
    fn run_options_builders() {
        let opts = RunOptions::default()
            .with_revision(4)
            .with_input("APP_NAME", "text:shop")
            .with_update_inputs(UpdateTarget::CurrentInstance);
        assert_eq!(opts.revision, Revision::Number(4));
        assert_eq!(opts.inputs.get("APP_NAME").map(String::as_str), Some("text:shop"));
        assert_eq!(opts.update_inputs.len(), 1);
    }

    #[test]
    fn load_password_auth_file_with_numeric_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auth.yaml");
        std::fs::write(
            &path,
            "email: ops@example.com\npassword: secret\naccount_id: 12345\n",
        )
        .unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.account_id.as_deref(), Some("12345"));
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert!(matches!(
            config.method().unwrap(),
            AuthMethod::Password { email: "ops@example.com", .. }
        ));
    }

    #[test]
    fn load_refresh_token_auth_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auth.yaml");
        std::fs::write(
            &path,
            "refresh_token: abcdef\naccount_id: \"777\"\napi_url: https://us-4.rightscale.com/\n",
        )
        .unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.api_url(), "https://us-4.rightscale.com");
        assert!(matches!(
            config.method().unwrap(),
            AuthMethod::RefreshToken { account_id: "777", .. }
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = AuthConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, MuleError::Io(_)));
    }

    #[test]
    fn auth_without_credentials_is_invalid() {
        let err = AuthConfig::from_pairs(["account_id:1"]).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn auth_without_account_is_invalid() {
        let err = AuthConfig::from_pairs(["email:a@b.c", "password:pw"]).unwrap_err();
        assert!(err.to_string().contains("account_id"));
    }

    #[test]
    fn from_pairs_keeps_colons_in_values() {
        let config = AuthConfig::from_pairs([
            "email:a@b.c",
            "password:pa:ss",
            "account_id:42",
            "api_url:http://localhost:9000",
        ])
        .unwrap();
        assert_eq!(config.password.as_deref(), Some("pa:ss"));
        assert_eq!(config.api_url(), "http://localhost:9000");
    }

    #[test]
    fn from_pairs_rejects_unknown_keys() {
        assert!(AuthConfig::from_pairs(["account_id:1", "colour:blue"]).is_err());
        assert!(AuthConfig::from_pairs(["no-colon"]).is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config =
            AuthConfig::from_pairs(["email:a@b.c", "password:topsecret", "account_id:1"]).unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("topsecret"));
        assert!(shown.contains("<redacted>"));
    }
}
