//! HTTP Request body types

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file upload.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        file_name: Option<String>,
        /// Explicit MIME type. Guessed from the file name when absent.
        mime_type: Option<String>,
        /// File contents.
        content: Vec<u8>,
    },
}

impl FormPart {
    /// Creates a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a file field from in-memory bytes.
    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self::File {
            name: name.into(),
            file_name: Some(file_name.into()),
            mime_type: None,
            content,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// HTTP request body.
///
/// Multipart bodies carry no content type of their own: the transport
/// generates the boundary and sets `multipart/form-data; boundary=...`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON document
    Json(serde_json::Value),
    /// Multipart form data
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    /// Creates a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns whether the body is empty or none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Json(_) => false,
            Self::Multipart(parts) => parts.is_empty(),
        }
    }

    /// Returns true for multipart bodies.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Returns the content type the client must set, if any.
    ///
    /// `None` for multipart: the transport owns that header.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::None | Self::Multipart(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(&serde_json::json!({ "amount": 10 })).unwrap();
        assert_eq!(body.content_type(), Some("application/json"));
        assert!(!body.is_empty());
    }

    #[test]
    fn test_multipart_body_has_no_content_type() {
        let body = RequestBody::Multipart(vec![
            FormPart::text("description", "March statement"),
            FormPart::file("document", "statement.pdf", b"%PDF".to_vec()),
        ]);
        assert!(body.is_multipart());
        assert_eq!(body.content_type(), None);
    }

    #[test]
    fn test_empty_body() {
        assert!(RequestBody::None.is_empty());
        assert!(RequestBody::Multipart(Vec::new()).is_empty());
        assert_eq!(RequestBody::None.content_type(), None);
    }
}
