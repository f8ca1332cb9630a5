//! Multipart form building.

use std::path::Path;

use bankline_application::ports::TransportError;
use bankline_domain::FormPart;
use reqwest::multipart::{Form, Part};

/// Error reading a file for upload.
#[derive(Debug, thiserror::Error)]
pub enum FilePartError {
    /// Failed to read file.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying error.
        message: String,
    },
}

/// Builds a reqwest multipart form from form parts.
///
/// File parts without an explicit MIME type get one guessed from the file
/// name, falling back to `application/octet-stream`.
///
/// # Errors
///
/// Returns [`TransportError::InvalidBody`] if a MIME type does not parse.
pub fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();

    for part in parts {
        match part {
            FormPart::Text { name, value } => {
                form = form.text(name.clone(), value.clone());
            }
            FormPart::File {
                name,
                file_name,
                mime_type,
                content,
            } => {
                let mime_type = mime_type
                    .clone()
                    .unwrap_or_else(|| guess_mime(file_name.as_deref()).to_string());

                let mut file = Part::bytes(content.clone())
                    .mime_str(&mime_type)
                    .map_err(|e| TransportError::InvalidBody(format!("invalid MIME type: {e}")))?;
                if let Some(file_name) = file_name {
                    file = file.file_name(file_name.clone());
                }

                form = form.part(name.clone(), file);
            }
        }
    }

    Ok(form)
}

/// Reads a file from disk into a multipart file part.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn file_part(
    name: impl Into<String>,
    path: impl AsRef<Path>,
) -> Result<FormPart, FilePartError> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| FilePartError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    let mime_type = guess_mime(Some(&file_name)).to_string();

    Ok(FormPart::File {
        name: name.into(),
        file_name: Some(file_name),
        mime_type: Some(mime_type),
        content,
    })
}

fn guess_mime(file_name: Option<&str>) -> mime::Mime {
    file_name.map_or(mime::APPLICATION_OCTET_STREAM, |name| {
        mime_guess::from_path(name).first_or_octet_stream()
    })
}
