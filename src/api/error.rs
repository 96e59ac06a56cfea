use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid credentials: {0}")]
    CredentialsInvalid(String),

    #[error(
        "Every client identifier was rejected - the service has likely rotated \
         its client id. Last error: {0}"
    )]
    ClientIdsExhausted(String),

    #[error("Upstream error {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        // Back off to a char boundary so multi-byte text cannot panic
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn upstream(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Upstream {
            status,
            body: Self::truncate_body(body),
        }
    }
}

/// Whether a 401 body blames the client identifier rather than the
/// credentials. A substring heuristic: the upstream error payload's string
/// form has historically contained `invalid_client` when the identifier is
/// stale. Treated as a heuristic, not a contract.
pub fn is_invalid_client(body: &str) -> bool {
    body.contains("invalid_client")
}
