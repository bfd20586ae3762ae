//! # Assessment Request Model
//!
//! Wire and in-memory shape of an assessment request, plus the shape checks
//! applied before a request is fingerprinted or forwarded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Upper bound on any single content field (32 MiB)
pub const MAX_CONTENT_BYTES: usize = 32 * 1024 * 1024;

/// Upper bound on the number of attached image files
pub const MAX_IMAGES: usize = 16;

/// Request shape violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is too large: {size} bytes (max: {max})")]
    ContentTooLarge {
        field: &'static str,
        size: usize,
        max: usize,
    },

    #[error("Too many images: {count} (max: {max})")]
    TooManyImages { count: usize, max: usize },

    #[error("Image attachments are only accepted for image tasks, got '{task_kind}'")]
    UnexpectedImages { task_kind: TaskKind },

    #[error("Image {index} has an empty file path")]
    EmptyImagePath { index: usize },

    #[error("Image {index} has unsupported MIME type '{mime_type}'")]
    UnsupportedImageType { index: usize, mime_type: String },
}

/// Kind of submission being judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[serde(alias = "TEXT")]
    Text,
    #[serde(alias = "TABLE")]
    Table,
    #[serde(alias = "IMAGE")]
    Image,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content field: either UTF-8 text or a raw byte sequence
///
/// On the wire, text is a JSON string and bytes are a JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// An image stored on disk that the downstream model should look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub file_path: PathBuf,
    #[serde(rename = "mimeType", alias = "declaredMimeType")]
    pub declared_mime_type: String,
}

impl ImageAttachment {
    pub fn new(file_path: impl Into<PathBuf>, declared_mime_type: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            declared_mime_type: declared_mime_type.into(),
        }
    }
}

/// An assessment request as received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[serde(alias = "taskType")]
    pub task_kind: TaskKind,
    pub reference: Content,
    pub template: Content,
    pub student_response: Content,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAttachment>,
    /// Prompt file for the downstream model; not part of the request identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,
}

impl AssessmentRequest {
    pub fn new(
        task_kind: TaskKind,
        reference: impl Into<Content>,
        template: impl Into<Content>,
        student_response: impl Into<Content>,
    ) -> Self {
        Self {
            task_kind,
            reference: reference.into(),
            template: template.into(),
            student_response: student_response.into(),
            images: Vec::new(),
            system_prompt_file: None,
        }
    }

    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }

    pub fn with_system_prompt_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_prompt_file = Some(path.into());
        self
    }

    /// Whether fingerprinting this request touches the filesystem
    pub fn reads_image_files(&self) -> bool {
        self.task_kind == TaskKind::Image && !self.images.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, content) in [
            ("reference", &self.reference),
            ("template", &self.template),
            ("studentResponse", &self.student_response),
        ] {
            if content.len() > MAX_CONTENT_BYTES {
                return Err(ValidationError::ContentTooLarge {
                    field,
                    size: content.len(),
                    max: MAX_CONTENT_BYTES,
                });
            }
        }

        if self.images.is_empty() {
            return Ok(());
        }

        if self.task_kind != TaskKind::Image {
            return Err(ValidationError::UnexpectedImages {
                task_kind: self.task_kind,
            });
        }

        if self.images.len() > MAX_IMAGES {
            return Err(ValidationError::TooManyImages {
                count: self.images.len(),
                max: MAX_IMAGES,
            });
        }

        for (index, image) in self.images.iter().enumerate() {
            if image.file_path.as_os_str().is_empty() {
                return Err(ValidationError::EmptyImagePath { index });
            }
            if !image
                .declared_mime_type
                .to_ascii_lowercase()
                .starts_with("image/")
            {
                return Err(ValidationError::UnsupportedImageType {
                    index,
                    mime_type: image.declared_mime_type.clone(),
                });
            }
        }

        Ok(())
    }
}
