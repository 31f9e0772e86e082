//! HTTP transport bound to one Starr instance.
//!
//! A [`Transport`] owns a `reqwest::Client` preconfigured with the instance's API key
//! and fixed default headers, and a base URL of `<url>/api/<version>/`. Building one
//! never touches the network.

use crate::error::{ReqError, StarrError, StarrResult};
use crate::models::{AppConfig, AppKind};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Header carrying the Starr API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base: Url,
    basic_auth: Option<(String, String)>,
}

impl Transport {
    /// Build a transport for `config`, speaking the API version of `kind`.
    pub fn new(config: &AppConfig, kind: AppKind) -> StarrResult<Self> {
        let base = api_base(&config.url, kind)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            let mut key = HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
                StarrError::InvalidConfig("API key contains invalid characters".to_string())
            })?;
            key.set_sensitive(true);
            headers.insert(API_KEY_HEADER, key);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.valid_ssl);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let basic_auth = (!config.username.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));

        tracing::trace!("Transport for {} ({}) at {}", config.name, kind, base);

        Ok(Self {
            http,
            base,
            basic_auth,
        })
    }

    /// Base URL all resource paths are joined onto.
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> StarrResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| StarrError::InvalidConfig(format!("bad request path '{path}': {e}")))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> StarrResult<T> {
        let req = self.http.get(self.url(path)?);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> StarrResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.post(self.url(path)?).json(body);
        Ok(self.send(req).await?.json().await?)
    }

    /// POST whose response body is ignored.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> StarrResult<()> {
        let req = self.http.post(self.url(path)?).json(body);
        self.send(req).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, query: &[(&str, String)], body: &B) -> StarrResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.put(self.url(path)?).query(query).json(body);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn delete(&self, path: &str) -> StarrResult<()> {
        let req = self.http.delete(self.url(path)?);
        self.send(req).await?;
        Ok(())
    }

    async fn send(&self, req: RequestBuilder) -> StarrResult<Response> {
        let req = match &self.basic_auth {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        };

        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!("{} {}", status.as_u16(), resp.url());

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let reason = status.canonical_reason().unwrap_or_default();
        Err(ReqError::from_response(status.as_u16(), reason, &body).into())
    }
}

/// `<url>/api/<version>/`, keeping any sub-path the instance is served under.
fn api_base(raw: &str, kind: AppKind) -> StarrResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StarrError::InvalidConfig("missing URL".to_string()));
    }

    let mut url = Url::parse(raw)
        .map_err(|e| StarrError::InvalidConfig(format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StarrError::InvalidConfig(format!(
            "URL '{raw}' must use http or https"
        )));
    }

    let path = format!(
        "{}/api/{}/",
        url.path().trim_end_matches('/'),
        kind.api_version()
    );
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
