//! # Assessment Response Cache
//!
//! Skips repeated downstream assessment calls for content that has already
//! been scored.
//!
//! ## Architecture
//!
//! ```text
//! CachePolicy                 <- which requests/responses participate
//!   └── Fingerprinter         <- canonical form + HMAC-SHA256 key
//! ResponseCache<V>            <- byte-budgeted LRU with per-entry TTL
//!   └── MeasuredSize / SizedValue  <- what each entry costs
//! ```
//!
//! ## Design Decisions
//!
//! - **Keys never contain content**: fingerprints are MACs over a canonical
//!   form, so student text cannot be recovered from the key space.
//! - **Byte budget, not item count**: payloads range from short text scores
//!   to multi-megabyte image submissions.
//! - **Only 2xx is stored**: an error response never replaces a cached
//!   success.
//! - **No single-flight**: concurrent identical misses each reach the
//!   downstream assessor.
//!
//! ## Usage
//!
//! The cache is wired into the web layer by the `response_cache` middleware.
//! One `ResponseCache` is built at startup and shared through `AppState`.

pub mod canonical;
pub mod errors;
pub mod fingerprint;
pub mod policy;
pub mod size;
pub mod store;

pub use canonical::CanonicalValue;
pub use errors::{CacheError, CacheResult};
pub use fingerprint::{canonicalize, fingerprint, Fingerprint, Fingerprinter};
pub use policy::{CachePolicy, ASSESS_ROUTE, CACHE_KEY_NAMESPACE};
pub use size::{structural_size, MeasuredSize, SizedValue, FALLBACK_ENTRY_SIZE_BYTES};
pub use store::{CacheStats, ResponseCache};
