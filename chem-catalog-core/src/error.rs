use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("Server error: {status}")]
    ServerError { status: u16 },
    /// The service answered with `success: false` or a non-2xx status carrying a message.
    #[error("Request rejected: {message}")]
    Rejected { status: Option<u16>, message: String },
    #[error("No session token available; run `chem-catalog session set-token <token>`")]
    NotAuthenticated,
    #[error("Response envelope is missing its data")]
    MissingData,
    #[error("Unknown product field: {0}")]
    UnknownField(String),
    #[error("Field `{0}` does not accept a file")]
    NotAnAttachment(&'static str),
    #[error("Invalid content type `{content_type}` for {file_name}")]
    InvalidContentType { file_name: String, content_type: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// True for failures where the service never produced a usable answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Network(_) | CatalogError::Serialization(_) | CatalogError::Io(_)
        )
    }

    /// Message shown at dialog level, preferring what the service said.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CatalogError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            CatalogError::NotAuthenticated => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_wins_over_fallback() {
        let err = CatalogError::Rejected {
            status: None,
            message: "CAS exists".to_string(),
        };
        assert_eq!(err.user_message("Failed to add product"), "CAS exists");
        assert!(!err.is_transport());
    }

    #[test]
    fn blank_rejection_uses_fallback() {
        let err = CatalogError::Rejected {
            status: Some(500),
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message("Update failed"), "Update failed");
    }

    #[test]
    fn server_error_uses_fallback() {
        let err = CatalogError::ServerError { status: 502 };
        assert_eq!(err.user_message("Failed to add product"), "Failed to add product");
    }

    #[test]
    fn bad_content_type_is_not_a_transport_failure() {
        let err = CatalogError::InvalidContentType {
            file_name: "msds.pdf".to_string(),
            content_type: "pdf".to_string(),
        };
        assert!(!err.is_transport());
    }
}
