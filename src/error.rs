use serde::Serialize;
use thiserror::Error;

/// Patterns (lowercase) that indicate sensitive data not safe for UI display.
/// Used by `contains_sensitive()` for case-insensitive matching.
pub(crate) const SENSITIVE_PATTERNS: &[&str] = &[
    "bearer ",
    "refresh_token",
    "access_token",
    "client_secret",
    "authorization:",
];

/// Returns true if the message contains any sensitive pattern (case-insensitive).
fn contains_sensitive(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Sanitizes a message for UI display.
/// If sensitive content is detected, returns the fallback instead.
fn sanitize_message(msg: &str, fallback: &str) -> String {
    if contains_sensitive(msg) {
        fallback.into()
    } else {
        msg.to_string()
    }
}

/// User-friendly error presentation for the web frontend.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPresentation {
    pub title: String,
    pub message: String,
    pub action: Option<String>,
}

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Auth ──────────────────────────────────────────────────────────────────
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    // ── API ───────────────────────────────────────────────────────────────────
    #[error("Xero error: {0}")]
    XeroError(String),

    #[error("Rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Reached maximum number of attempts ({attempts}) for {query} {endpoint}")]
    RetryExhausted {
        endpoint: String,
        query: String,
        attempts: u32,
    },

    #[error("No contact group matching any of: {names}")]
    NoMatchingGroup { names: String },

    // ── Export ────────────────────────────────────────────────────────────────
    #[error("CSV export error: {0}")]
    CsvExport(String),

    // ── Network ───────────────────────────────────────────────────────────────
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Converts the error into a user-friendly presentation suitable for UI display.
    /// Never leaks tokens or sensitive URL parameters.
    pub fn to_presentation(&self) -> ErrorPresentation {
        match self {
            // ── Auth ──────────────────────────────────────────────────────────
            AppError::NotAuthenticated => ErrorPresentation {
                title: "Not Logged In".into(),
                message: "You need to connect to Xero to continue.".into(),
                action: Some("Connect to Xero".into()),
            },

            AppError::SessionExpired => ErrorPresentation {
                title: "Session Expired".into(),
                message: "Your Xero session has expired.".into(),
                action: Some("Connect again".into()),
            },

            // ── API ───────────────────────────────────────────────────────────
            AppError::XeroError(msg) => ErrorPresentation {
                title: "Xero Error".into(),
                message: sanitize_message(msg, "A Xero API error occurred."),
                action: None,
            },

            AppError::RateLimited { retry_after_secs } => {
                let wait_msg = match retry_after_secs {
                    Some(secs) => format!("Please wait {} seconds before trying again.", secs),
                    None => "Please wait a moment before trying again.".into(),
                };
                ErrorPresentation {
                    title: "Too Many Requests".into(),
                    message: format!("Xero is limiting requests. {}", wait_msg),
                    action: Some("Wait and retry".into()),
                }
            }

            AppError::RetryExhausted {
                endpoint,
                query,
                attempts,
            } => ErrorPresentation {
                title: "Too Many Requests".into(),
                message: format!(
                    "Xero kept limiting requests; gave up after {} attempts ({} {}).",
                    attempts, query, endpoint
                ),
                action: Some("Wait a few minutes and retry".into()),
            },

            AppError::NoMatchingGroup { names } => ErrorPresentation {
                title: "Group Not Found".into(),
                message: format!("No Xero contact group matches: {}.", names),
                action: Some("Check the group name and retry".into()),
            },

            // ── Export ────────────────────────────────────────────────────────
            AppError::CsvExport(msg) => ErrorPresentation {
                title: "CSV Export Failed".into(),
                message: format!("Error while writing the export: {}", msg),
                action: Some("Try the export again".into()),
            },

            // ── Network ───────────────────────────────────────────────────────
            AppError::ConnectionFailed(_) => ErrorPresentation {
                title: "Connection Failed".into(),
                message: "Could not connect to Xero. Please check your internet connection.".into(),
                action: Some("Check network and retry".into()),
            },

            // ── Generic ───────────────────────────────────────────────────────
            AppError::Internal(_) => ErrorPresentation {
                title: "Unexpected Error".into(),
                message: "Something went wrong. Please try again.".into(),
                action: Some("Try again".into()),
            },
        }
    }
}

// Allow AppError to be returned straight to the web layer as JSON
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_presentation().serialize(serializer)
    }
}
