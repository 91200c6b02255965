//! Security utilities.
//!
//! Credential scrubbing keeps secrets read from the cluster out of the
//! terminal log.

pub mod credential_scrubber;

pub use credential_scrubber::scrub_credentials;
