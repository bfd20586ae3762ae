//! # Request Fingerprinting
//!
//! Turns an [`AssessmentRequest`] into a secret-keyed digest that identifies
//! the content being judged.
//!
//! The request is first reduced to a [`CanonicalValue`]:
//!
//! - **Text / table tasks**: the three content fields verbatim. No trimming or
//!   whitespace folding; a single extra space yields a different key.
//! - **Image tasks without attachments**: each content field is normalized so
//!   that raw bytes and a `data:` URI carrying the same bytes and MIME type
//!   collapse to the same `{mimeType, data}` pair.
//! - **Image tasks with attachments**: the inline fields are ignored and each
//!   file contributes `{mimeType, contentHash}`, so identity follows file
//!   content rather than file path.
//!
//! `system_prompt_file` never participates. The canonical string is then
//! authenticated with HMAC-SHA256 under the configured secret, which keeps
//! plaintext submissions out of the key space and lets operators invalidate
//! every key by rotating the secret.

use super::canonical::CanonicalValue;
use super::errors::{CacheError, CacheResult};
use crate::assessment::{AssessmentRequest, Content, ImageAttachment, TaskKind};
use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// MIME type reported when no known magic bytes match
pub const OCTET_STREAM: &str = "application/octet-stream";

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Hex-encoded HMAC-SHA256 of a canonical request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyed fingerprint deriver
///
/// Holds a MAC already keyed with the secret; each call clones it, so the
/// key schedule runs once per process instead of once per request.
#[derive(Clone)]
pub struct Fingerprinter {
    mac: HmacSha256,
}

impl fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprinter")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Fingerprinter {
    pub fn new(secret: &str) -> CacheResult<Self> {
        if secret.is_empty() {
            return Err(CacheError::InvalidSecret(
                "fingerprint secret must not be empty".to_string(),
            ));
        }

        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CacheError::InvalidSecret(e.to_string()))?;

        Ok(Self { mac })
    }

    pub fn fingerprint(&self, request: &AssessmentRequest) -> CacheResult<Fingerprint> {
        let canonical = canonicalize(request)?;
        Ok(self.sign(&canonical.to_canonical_string()?))
    }

    fn sign(&self, canonical: &str) -> Fingerprint {
        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        Fingerprint(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Derive the fingerprint of `request` under `secret`
pub fn fingerprint(request: &AssessmentRequest, secret: &str) -> CacheResult<Fingerprint> {
    Fingerprinter::new(secret)?.fingerprint(request)
}

/// Reduce a request to its canonical, identity-bearing form
///
/// Reads attached image files; fails with [`CacheError::MissingResource`]
/// when one cannot be read.
pub fn canonicalize(request: &AssessmentRequest) -> CacheResult<CanonicalValue> {
    let task_kind = CanonicalValue::from(request.task_kind.as_str());

    match request.task_kind {
        TaskKind::Text | TaskKind::Table => Ok(CanonicalValue::object([
            ("taskKind", task_kind),
            ("reference", verbatim_content(&request.reference)),
            ("template", verbatim_content(&request.template)),
            ("studentResponse", verbatim_content(&request.student_response)),
        ])),
        TaskKind::Image if request.images.is_empty() => Ok(CanonicalValue::object([
            ("taskKind", task_kind),
            ("reference", normalize_image_content(&request.reference)),
            ("template", normalize_image_content(&request.template)),
            (
                "studentResponse",
                normalize_image_content(&request.student_response),
            ),
        ])),
        TaskKind::Image => {
            let images = request
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| hash_image_file(index, image))
                .collect::<CacheResult<Vec<_>>>()?;

            Ok(CanonicalValue::object([
                ("taskKind", task_kind),
                ("images", CanonicalValue::List(images)),
            ]))
        }
    }
}

fn verbatim_content(content: &Content) -> CanonicalValue {
    match content {
        Content::Text(text) => CanonicalValue::from(text.as_str()),
        Content::Bytes(bytes) => {
            CanonicalValue::object([("bytes", CanonicalValue::from(BASE64_STANDARD.encode(bytes)))])
        }
    }
}

fn normalize_image_content(content: &Content) -> CanonicalValue {
    match content {
        Content::Bytes(bytes) => {
            image_value(sniff_mime_type(bytes).to_string(), BASE64_STANDARD.encode(bytes))
        }
        Content::Text(text) => match parse_data_uri(text) {
            Some((mime_type, data)) => match decode_data_payload(data) {
                Some(bytes) => image_value(mime_type, BASE64_STANDARD.encode(bytes)),
                None => image_value(mime_type, data.to_string()),
            },
            None => CanonicalValue::from(text.as_str()),
        },
    }
}

/// Decode a data-URI payload regardless of padding or line wrapping
fn decode_data_payload(data: &str) -> Option<Vec<u8>> {
    let compact: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(compact).ok()
}

fn image_value(mime_type: String, data: String) -> CanonicalValue {
    CanonicalValue::object([
        ("mimeType", CanonicalValue::from(mime_type)),
        ("data", CanonicalValue::from(data)),
    ])
}

fn hash_image_file(index: usize, image: &ImageAttachment) -> CacheResult<CanonicalValue> {
    let bytes = std::fs::read(&image.file_path)
        .map_err(|e| CacheError::missing_resource(index, &image.file_path, e.to_string()))?;

    Ok(CanonicalValue::object([
        (
            "mimeType",
            CanonicalValue::from(image.declared_mime_type.as_str()),
        ),
        ("contentHash", CanonicalValue::from(sha256_hex(&bytes))),
    ]))
}

/// Plain SHA-256 of raw bytes, hex-encoded
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Identify common image formats from their leading magic bytes
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF") {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        OCTET_STREAM
    }
}

/// Split a base64 `data:` URI into its lower-cased MIME type and payload
///
/// Parameters between the MIME type and `;base64,` are dropped. Returns
/// `None` for anything that is not a base64 data URI.
pub fn parse_data_uri(value: &str) -> Option<(String, &str)> {
    let rest = value.strip_prefix(DATA_URI_SCHEME)?;
    let marker = rest.find(BASE64_MARKER)?;
    let header = &rest[..marker];
    let data = &rest[marker + BASE64_MARKER.len()..];

    let mime_type = header.split(';').next().unwrap_or_default().to_lowercase();
    Some((mime_type, data))
}
