//! Client configuration: API version, base URI and session.
//!
//! # Design
//! `PrismConfig` is an immutable value. Attaching a session produces a new
//! config via `with_session`, so a request built from an earlier snapshot
//! keeps the headers it was built with. The `build_*` methods turn an
//! endpoint path plus parameters into an `HttpRequest` carrying the shared
//! headers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::form_urlencoded;
use url::Url;

use crate::error::{PrismError, PrismResult};
use crate::http::{HttpMethod, HttpRequest, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};

/// Hostname used when none is given.
pub const DEFAULT_HOSTNAME: &str = "https://api.prismhr.com/";

/// Header carrying the session token on authenticated requests.
pub const SESSION_HEADER: &str = "sessionId";

/// API versions the client knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V1_18,
    V1_19,
    V1_20,
    V1_21,
    #[default]
    V1_22,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 5] = [
        ApiVersion::V1_18,
        ApiVersion::V1_19,
        ApiVersion::V1_20,
        ApiVersion::V1_21,
        ApiVersion::V1_22,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1_18 => "1.18",
            ApiVersion::V1_19 => "1.19",
            ApiVersion::V1_20 => "1.20",
            ApiVersion::V1_21 => "1.21",
            ApiVersion::V1_22 => "1.22",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| PrismError::Configuration(format!("invalid version given: '{s}'")))
    }
}

/// Opaque session token returned by login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(..)")
    }
}

/// Base URI plus optional session, shared by every service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrismConfig {
    version: ApiVersion,
    base_uri: Url,
    session: Option<Session>,
}

impl PrismConfig {
    /// Builds `{hostname}api-{version}/services/rest/`.
    ///
    /// Fails with `PrismError::Configuration` when `hostname` is not an
    /// absolute URL with a host, or `version` is not a supported version.
    pub fn new(version: &str, hostname: &str) -> PrismResult<Self> {
        let host = parse_hostname(hostname)?;
        let version: ApiVersion = version.parse()?;
        Self::from_parts(version, host)
    }

    /// Like `new`, for callers that already hold a typed version.
    pub fn for_version(version: ApiVersion, hostname: &str) -> PrismResult<Self> {
        Self::from_parts(version, parse_hostname(hostname)?)
    }

    fn from_parts(version: ApiVersion, host: Url) -> PrismResult<Self> {
        // The base must end in '/' or `join` would drop its last segment.
        let mut raw = String::from(host);
        if !raw.ends_with('/') {
            raw.push('/');
        }
        raw.push_str(&format!("api-{}/services/rest/", version.as_str()));
        let base_uri = Url::parse(&raw)
            .map_err(|e| PrismError::Configuration(format!("invalid base uri '{raw}': {e}")))?;
        Ok(Self {
            version,
            base_uri,
            session: None,
        })
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn base_uri(&self) -> &str {
        self.base_uri.as_str()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns a copy of this config that sends `session` on every request.
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            session: Some(session),
            ..self.clone()
        }
    }

    fn endpoint(&self, path: &str) -> PrismResult<Url> {
        self.base_uri
            .join(path)
            .map_err(|e| PrismError::Configuration(format!("invalid endpoint '{path}': {e}")))
    }

    fn headers(&self, content_type: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![("accept".to_string(), JSON_CONTENT_TYPE.to_string())];
        if let Some(content_type) = content_type {
            headers.push(("content-type".to_string(), content_type.to_string()));
        }
        if let Some(session) = &self.session {
            headers.push((SESSION_HEADER.to_string(), session.token().to_string()));
        }
        headers
    }

    /// GET `path` with `query` appended in order. Repeated keys are kept.
    pub fn build_get(&self, path: &str, query: &[(&str, &str)]) -> PrismResult<HttpRequest> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: self.headers(None),
            body: None,
        })
    }

    /// POST `path` with a form-encoded body.
    pub fn build_post_form(&self, path: &str, form: &[(&str, &str)]) -> PrismResult<HttpRequest> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint(path)?.into(),
            headers: self.headers(Some(FORM_CONTENT_TYPE)),
            body: Some(body),
        })
    }

    /// POST `path` with `payload` serialized as JSON.
    pub fn build_post_json<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
    ) -> PrismResult<HttpRequest> {
        let body = serde_json::to_string(payload)
            .map_err(|e| PrismError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint(path)?.into(),
            headers: self.headers(Some(JSON_CONTENT_TYPE)),
            body: Some(body),
        })
    }
}

fn parse_hostname(hostname: &str) -> PrismResult<Url> {
    if hostname.is_empty() {
        return Err(PrismError::Configuration("invalid hostname given: ''".to_string()));
    }
    let url = Url::parse(hostname)
        .map_err(|e| PrismError::Configuration(format!("invalid hostname given: '{hostname}' ({e})")))?;
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(PrismError::Configuration(format!(
            "invalid hostname given: '{hostname}'"
        )));
    }
    Ok(url)
}
