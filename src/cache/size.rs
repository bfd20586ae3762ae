//! # Entry Size Accounting
//!
//! The response cache is budgeted in bytes, so every stored value has to say
//! what it costs. Values that already know their true cost wrap themselves in
//! [`SizedValue`]; byte and string types report their length; anything else
//! can be priced structurally through [`structural_size`].

use axum::body::Bytes;
use serde::Serialize;
use tracing::debug;

/// Charge applied when a value cannot be serialized for measurement
pub const FALLBACK_ENTRY_SIZE_BYTES: usize = 1024;

/// Byte cost of a value held by the response cache
pub trait MeasuredSize {
    fn size_bytes(&self) -> usize;
}

/// A payload paired with an explicitly declared byte cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedValue<T> {
    bytes: usize,
    payload: T,
}

impl<T> SizedValue<T> {
    pub fn new(bytes: usize, payload: T) -> Self {
        Self { bytes, payload }
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> MeasuredSize for SizedValue<T> {
    fn size_bytes(&self) -> usize {
        self.bytes
    }
}

impl MeasuredSize for Vec<u8> {
    fn size_bytes(&self) -> usize {
        self.len()
    }
}

impl MeasuredSize for Bytes {
    fn size_bytes(&self) -> usize {
        self.len()
    }
}

impl MeasuredSize for String {
    fn size_bytes(&self) -> usize {
        self.len()
    }
}

impl MeasuredSize for serde_json::Value {
    fn size_bytes(&self) -> usize {
        structural_size(self)
    }
}

/// Length of the compact JSON serialization of `value`
///
/// Falls back to [`FALLBACK_ENTRY_SIZE_BYTES`] when the value cannot be
/// serialized (for example, maps with non-string keys).
pub fn structural_size<T>(value: &T) -> usize
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(value) {
        Ok(serialized) => serialized.len(),
        Err(e) => {
            debug!(
                error = %e,
                fallback_bytes = FALLBACK_ENTRY_SIZE_BYTES,
                "Could not serialize cache value for sizing, using fallback estimate"
            );
            FALLBACK_ENTRY_SIZE_BYTES
        }
    }
}
