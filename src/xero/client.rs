//! Xero HTTP client with secure credential handling and safe logging.

use std::time::{Duration, Instant, SystemTime};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// User agent string for all Xero API requests.
const CLIENT_USER_AGENT: &str = "XeroContactExport/0.1.0";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Xero Accounting API base URL. The trailing slash matters for `Url::join`.
pub const DEFAULT_BASE_URL: &str = "https://api.xero.com/api.xro/2.0/";

/// Tenant selector header required by the Xero API.
const TENANT_HEADER: &str = "xero-tenant-id";

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Bearer/session state issued by the OAuth2 layer that owns the token
/// lifecycle. The core receives this per call, treats it read-only, and
/// never refreshes or persists it.
///
/// The token is wrapped in `SecretString` to prevent accidental exposure
/// through `Debug` or logging.
#[derive(Clone)]
pub struct Credentials {
    /// Xero tenant (organisation) selector set by the OAuth callback.
    pub tenant_id: String,
    /// OAuth access token (wrapped for security).
    pub access_token: SecretString,
    /// Token expiry, when the issuing layer knows it.
    pub expires_at: Option<SystemTime>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credentials {
    /// Creates credentials for a tenant with no known expiry.
    pub fn new(tenant_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            access_token: SecretString::from(access_token.into()),
            expires_at: None,
        }
    }

    /// Returns true if the token's expiry instant has passed.
    ///
    /// Refreshing is the caller's job; the core only reports staleness.
    pub fn expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if at <= SystemTime::now())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types (match Xero JSON exactly)
// ─────────────────────────────────────────────────────────────────────────────

/// A contact group record as returned by `GET /ContactGroups`.
///
/// The member list is only populated when fetching a single group by ID.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactGroup {
    #[serde(rename = "ContactGroupID", default)]
    pub contact_group_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contacts: Vec<GroupMember>,
}

/// Abbreviated contact entry inside a group's member list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupMember {
    #[serde(rename = "ContactID", default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Envelope wrapping every ContactGroups response.
#[derive(Debug, Deserialize)]
struct ContactGroupsEnvelope {
    #[serde(rename = "ContactGroups", default)]
    contact_groups: Vec<ContactGroup>,
}

/// Envelope wrapping every Contacts response. Records stay raw JSON here;
/// parsing into [`crate::xero::contact::Contact`] happens in the fetcher.
#[derive(Debug, Deserialize)]
struct ContactsEnvelope {
    #[serde(rename = "Contacts", default)]
    contacts: Vec<serde_json::Value>,
}

/// Xero API error body. Which of these fields is present varies by endpoint.
#[derive(Debug, Deserialize)]
struct WireXeroError {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Detail")]
    detail: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// XeroClient
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the three Xero operations the export pipeline consumes:
/// list contact groups, get one group with members, and filter contacts.
///
/// Constructed per pipeline invocation from caller-supplied [`Credentials`];
/// holds no mutable state and never refreshes the token.
#[derive(Clone)]
pub struct XeroClient {
    /// The underlying HTTP client with auth and tenant headers baked in.
    http: reqwest::Client,
    /// API base URL; overridable for tests.
    base_url: Url,
}

impl XeroClient {
    /// Creates a client against the production Xero API.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` if the token is empty and
    /// `AppError::Internal` if the HTTP client fails to initialize.
    pub fn new(creds: &Credentials) -> Result<Self, AppError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|_| AppError::Internal("Invalid base URL".to_string()))?;
        Self::with_base_url(creds, base_url)
    }

    /// Creates a client against an explicit base URL.
    ///
    /// The URL must end with a trailing slash for path joining to work.
    pub fn with_base_url(creds: &Credentials, base_url: Url) -> Result<Self, AppError> {
        if creds.access_token.expose_secret().is_empty() {
            return Err(AppError::NotAuthenticated);
        }

        let http = build_http_client(creds)?;
        Ok(Self { http, base_url })
    }

    /// Lists all contact groups in the tenant.
    ///
    /// # Errors
    ///
    /// - `AppError::RateLimited` - Xero returned 429
    /// - `AppError::SessionExpired` - token rejected; caller must refresh
    /// - `AppError::XeroError` - any other API failure
    /// - `AppError::ConnectionFailed` - network error
    pub async fn list_contact_groups(&self) -> Result<Vec<ContactGroup>, AppError> {
        let response = self.get("ContactGroups", &[]).await?;
        let envelope: ContactGroupsEnvelope = response.json().await.map_err(|e| {
            AppError::Internal(format!("Failed to parse contact groups response: {}", e))
        })?;
        Ok(envelope.contact_groups)
    }

    /// Fetches a single contact group by ID, including its member list.
    ///
    /// # Errors
    ///
    /// Same as [`list_contact_groups`](Self::list_contact_groups), plus
    /// `AppError::XeroError` if the response carries no group.
    pub async fn get_contact_group(&self, group_id: &str) -> Result<ContactGroup, AppError> {
        let path = format!("ContactGroups/{}", group_id);
        let response = self.get(&path, &[]).await?;
        let envelope: ContactGroupsEnvelope = response.json().await.map_err(|e| {
            AppError::Internal(format!("Failed to parse contact group response: {}", e))
        })?;

        envelope
            .contact_groups
            .into_iter()
            .next()
            .ok_or_else(|| AppError::XeroError(format!("Contact group {} not found", group_id)))
    }

    /// Filters contacts with a raw Xero `where` expression.
    ///
    /// Returns raw records; the caller decides how to shape them.
    ///
    /// # Security
    ///
    /// The `where` clause carries contact IDs and is never logged.
    pub async fn filter_contacts(
        &self,
        where_clause: &str,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let response = self.get("Contacts", &[("where", where_clause)]).await?;
        let envelope: ContactsEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse contacts response: {}", e)))?;
        Ok(envelope.contacts)
    }

    /// Executes a GET with timing and path-only logging, mapping failure
    /// statuses to the error taxonomy.
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, AppError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| AppError::Internal(format!("Invalid path: {}", path)))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }

        let start = Instant::now();
        // Log the path only; query strings carry contact data
        let logged_path = url.path().to_string();

        let result = self.http.get(url).send().await;
        let duration_ms = start.elapsed().as_millis();

        let response = match result {
            Ok(response) => response,
            Err(_) => {
                info!("[XERO] GET {} FAILED {}ms", logged_path, duration_ms);
                return Err(AppError::ConnectionFailed(
                    "Connection to Xero failed".to_string(),
                ));
            }
        };

        let status = response.status();
        info!(
            "[XERO] GET {} {} {}ms",
            logged_path,
            status.as_u16(),
            duration_ms
        );

        if status.is_success() {
            return Ok(response);
        }

        Err(map_error_response(response, status).await)
    }
}

/// Maps a non-2xx response to the error taxonomy.
async fn map_error_response(
    response: reqwest::Response,
    status: reqwest::StatusCode,
) -> AppError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return AppError::RateLimited {
            retry_after_secs: retry_after,
        };
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return AppError::SessionExpired;
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("Unable to read error body"));

    if let Ok(wire) = serde_json::from_str::<WireXeroError>(&body) {
        let detail = wire
            .detail
            .or(wire.message)
            .or(wire.title)
            .unwrap_or_else(|| "Unknown error".to_string());
        return AppError::XeroError(format!("[{}] {}", status.as_u16(), detail));
    }

    AppError::XeroError(format!(
        "HTTP {} - {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown error")
    ))
}

/// Builds the configured HTTP client with auth headers baked in.
fn build_http_client(creds: &Credentials) -> Result<reqwest::Client, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut auth = HeaderValue::from_str(&format!(
        "Bearer {}",
        creds.access_token.expose_secret()
    ))
    .map_err(|_| AppError::Internal("Invalid access token".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    let tenant = HeaderValue::from_str(&creds.tenant_id)
        .map_err(|_| AppError::Internal("Invalid tenant id".to_string()))?;
    headers.insert(TENANT_HEADER, tenant);

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
