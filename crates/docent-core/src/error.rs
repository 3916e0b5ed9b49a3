use docent_memory::{DocumentError, IndexError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required resource (uploaded documents, vector index) is missing.
    #[error("{0}")]
    NotFound(String),

    #[error("{0} already exists in the upload folder")]
    Duplicate(String),

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("query limit of {max} reached for this session")]
    QuotaExceeded { max: u32 },

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error(transparent)]
    Llm(#[from] docent_llm::LlmError),

    #[error(transparent)]
    Document(DocumentError),

    #[error(transparent)]
    Index(IndexError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocumentError> for CoreError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::NotFound(dir) => {
                let absolute = std::path::Path::new(&dir).is_absolute();
                let sep = if absolute { "" } else { "/" };
                Self::NotFound(format!("No PDFs found in given folder - {sep}{dir}."))
            }
            other => Self::Document(other),
        }
    }
}

impl From<IndexError> for CoreError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::NotFound => Self::NotFound(e.to_string()),
            other => Self::Index(other),
        }
    }
}

impl CoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_folder_maps_to_not_found() {
        let err: CoreError = DocumentError::NotFound("data".into()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No PDFs found in given folder - /data.");
    }

    #[test]
    fn absolute_folder_is_not_double_slashed() {
        let err: CoreError = DocumentError::NotFound("/tmp/x/data".into()).into();
        assert_eq!(err.to_string(), "No PDFs found in given folder - /tmp/x/data.");
    }

    #[test]
    fn missing_index_maps_to_not_found() {
        let err: CoreError = IndexError::NotFound.into();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("rebuild the index"));
    }

    #[test]
    fn other_errors_keep_their_kind() {
        let err: CoreError = DocumentError::FileTooLarge(10).into();
        assert!(matches!(err, CoreError::Document(_)));
        let err: CoreError = IndexError::Dimension {
            expected: 2,
            actual: 3,
        }
        .into();
        assert!(matches!(err, CoreError::Index(_)));
    }

    #[test]
    fn quota_message_names_limit() {
        let err = CoreError::QuotaExceeded { max: 5 };
        assert_eq!(err.to_string(), "query limit of 5 reached for this session");
    }
}
