//! Report validation errors

/// Why an inbound position report was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// Identity was present but empty
    #[error("Peer identity is empty")]
    EmptyIdentity,
    /// A required field was absent or null
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ReportError::EmptyIdentity.to_string(), "Peer identity is empty");
        assert_eq!(
            ReportError::MissingField("latitude").to_string(),
            "Missing field: latitude"
        );
    }
}
