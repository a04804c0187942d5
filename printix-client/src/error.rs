//! Client error types.

use printix_core::{AuthError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered 2xx but reported `success: false`.
    #[error("{operation} failed: {description} (error ID: {error_id})")]
    Api {
        operation: &'static str,
        description: String,
        error_id: String,
    },

    #[error("tenant ID is required for {operation}")]
    MissingTenant { operation: &'static str },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("printer with name {name} not found")]
    PrinterNotFound { name: String },

    #[error("upload failed with status {status}: {body}")]
    UploadFailed { status: u16, body: String },

    #[error("no upload links provided")]
    NoUploadLinks,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A failure inside a multi-step operation, labelled with the step.
    #[error("{stage}: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Wrap this error with the name of the step that produced it.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        ClientError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any stage labels.
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.root(), ClientError::Auth(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Cap diagnostic bodies so a misbehaving endpoint cannot flood logs or errors.
pub(crate) fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 512;
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_and_root() {
        let err = ClientError::NoUploadLinks
            .in_stage("uploading document")
            .in_stage("printing report.pdf");
        assert_eq!(
            err.to_string(),
            "printing report.pdf: uploading document: no upload links provided"
        );
        assert!(matches!(err.root(), ClientError::NoUploadLinks));
    }

    #[test]
    fn test_is_auth_failure_sees_through_stages() {
        let err = ClientError::from(AuthError::AuthenticationFailed {
            status: 401,
            body: "invalid_client".to_string(),
        })
        .in_stage("submitting print job");
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            operation: "submit",
            description: "Printer not found".to_string(),
            error_id: "E-42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "submit failed: Printer not found (error ID: E-42)"
        );
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(600);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 512 + 3);
        assert_eq!(snippet("short"), "short");
    }
}
