//! Error types for the content client.

/// Error from a remote API call, before classification.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// HTTP request failed (network error, TLS, etc).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// HTTP status code, if the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::Json(_) | Self::Other(_) => None,
        }
    }
}

/// Error from content client operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Remote entity does not exist or is not shared with the integration.
    #[error(
        "Content not found: {id}. Check the id and that the page is shared with the integration"
    )]
    NotFound {
        /// Requested page, block or database id.
        id: String,
    },

    /// Credential is invalid or lacks access.
    #[error(
        "Unauthorized to access {id}. Check the API key and the integration's access to the content"
    )]
    Unauthorized {
        /// Requested page, block or database id.
        id: String,
    },

    /// Remote throttling.
    #[error("Rate limited by the Notion API. Retry later")]
    RateLimited,

    /// Required configuration value is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unclassified remote failure.
    #[error("Failed to {context}: {source}")]
    Api {
        /// What the client was doing.
        context: String,
        /// Underlying failure.
        #[source]
        source: ApiError,
    },
}

/// Map a remote failure to a specific content error.
///
/// Uses the HTTP status when there is one, otherwise the status code in the
/// error text. API error codes in the text are recognized either way.
/// Transport failures are only classified by status: their text carries the
/// request URL, whose ids may contain any digits.
pub(crate) fn classify(err: ApiError, id: &str, context: impl Into<String>) -> ContentError {
    let text = match err {
        ApiError::Request(_) => String::new(),
        _ => err.to_string().to_lowercase(),
    };
    let status = err.status();
    let is = |codes: &[u16], markers: &[&str]| {
        let by_status = match status {
            Some(status) => codes.contains(&status),
            None => codes.iter().any(|code| text.contains(&code.to_string())),
        };
        by_status || markers.iter().any(|m| text.contains(m))
    };

    if is(&[404], &["object_not_found"]) {
        ContentError::NotFound { id: id.to_owned() }
    } else if is(&[401, 403], &["unauthorized", "restricted_resource"]) {
        ContentError::Unauthorized { id: id.to_owned() }
    } else if is(&[429], &["rate_limited"]) {
        ContentError::RateLimited
    } else {
        ContentError::Api {
            context: context.into(),
            source: err,
        }
    }
}
