//! Blocking HTTP implementation of [`RightApi`] for the RightScale API 1.5.
//!
//! Authentication happens once, when the client is constructed: a password
//! login leaves a session cookie in reqwest's cookie store, a refresh token
//! is exchanged for a bearer access token. No retries, no pagination.

use crate::api::{ExecuteParams, Link, Resource, RightApi, RightScript, TaggedResource};
use crate::config::{AuthConfig, AuthMethod};
use crate::error::{MuleError, Result};
use crate::types::Inputs;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use std::time::Duration;

const API_VERSION: &str = "1.5";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct HttpRightApi {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct OAuthToken {
    access_token: String,
}

#[derive(Deserialize)]
struct RawRightScript {
    name: String,
    revision: i64,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Deserialize)]
struct RawResource {
    #[serde(default)]
    links: Vec<Link>,
}

impl HttpRightApi {
    /// Build a client and authenticate against `auth.api_url`.
    pub fn connect(auth: &AuthConfig) -> Result<Self> {
        let method = auth.method()?;
        let account_id = match method {
            AuthMethod::Password { account_id, .. } | AuthMethod::RefreshToken { account_id, .. } => {
                account_id
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-account",
            HeaderValue::from_str(account_id).map_err(|_| {
                MuleError::InvalidConfig(format!("account_id '{account_id}' is not a valid header value"))
            })?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(
                auth.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()?;

        let mut api = HttpRightApi {
            http,
            base_url: auth.api_url().to_string(),
            access_token: None,
        };

        match method {
            AuthMethod::Password {
                email,
                password,
                account_id,
            } => {
                let account_href = format!("/api/accounts/{account_id}");
                let url = api.url("/api/session");
                tracing::debug!(%url, email, "logging in");
                api.send(
                    api.http.post(&url).form(&[
                        ("email", email),
                        ("password", password),
                        ("account_href", account_href.as_str()),
                    ]),
                    &url,
                )?;
            }
            AuthMethod::RefreshToken { refresh_token, .. } => {
                let url = api.url("/api/oauth2");
                tracing::debug!(%url, "exchanging refresh token");
                let token: OAuthToken = api
                    .send(
                        api.http.post(&url).form(&[
                            ("grant_type", "refresh_token"),
                            ("refresh_token", refresh_token),
                        ]),
                        &url,
                    )?
                    .json()?;
                api.access_token = Some(token.access_token);
            }
        }

        Ok(api)
    }

    fn url(&self, href: &str) -> String {
        format!("{}{}", self.base_url, href)
    }

    fn send(&self, req: RequestBuilder, url: &str) -> Result<Response> {
        let req = match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(MuleError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

impl RightApi for HttpRightApi {
    fn instances_by_tag(&self, tags: &[String], match_all: bool) -> Result<Vec<TaggedResource>> {
        let url = self.url("/api/tags/by_tag");
        let body = serde_json::json!({
            "resource_type": "instances",
            "tags": tags,
            "match_all": if match_all { "true" } else { "false" },
        });
        tracing::debug!(%url, ?tags, match_all, "querying instances by tag");
        Ok(self.send(self.http.post(&url).json(&body), &url)?.json()?)
    }

    fn right_script_lineage(&self, name: &str) -> Result<Vec<RightScript>> {
        let url = self.url("/api/right_scripts");
        let filter = format!("name=={name}");
        tracing::debug!(%url, %filter, "fetching right script lineage");
        let raw: Vec<RawRightScript> = self
            .send(self.http.get(&url).query(&[("filter[]", filter.as_str())]), &url)?
            .json()?;

        // The server-side filter also matches partial names.
        raw.into_iter()
            .filter(|rs| rs.name == name)
            .map(|rs| -> Result<RightScript> {
                let href = rs
                    .links
                    .iter()
                    .find(|l| l.rel == "self")
                    .map(|l| l.href.clone())
                    .ok_or_else(|| MuleError::MissingLink {
                        href: format!("right script '{}' revision {}", rs.name, rs.revision),
                        rel: "self".into(),
                    })?;
                Ok(RightScript {
                    name: rs.name,
                    revision: rs.revision,
                    href,
                })
            })
            .collect()
    }

    fn show(&self, href: &str) -> Result<Resource> {
        let url = self.url(href);
        let raw: RawResource = self.send(self.http.get(&url), &url)?.json()?;
        Ok(Resource {
            href: href.to_string(),
            links: raw.links,
        })
    }

    fn run_executable(&self, instance_href: &str, params: &ExecuteParams) -> Result<()> {
        let url = self.url(&format!("{instance_href}/run_executable"));
        self.send(self.http.post(&url).json(params), &url)?;
        Ok(())
    }

    fn multi_update_inputs(&self, owner_href: &str, inputs: &Inputs) -> Result<()> {
        let url = self.url(&format!("{owner_href}/inputs/multi_update"));
        let body = serde_json::json!({ "inputs": inputs });
        self.send(self.http.put(&url).json(&body), &url)?;
        Ok(())
    }
}
