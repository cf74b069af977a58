//! Blocking client for the COS object-storage REST API.
//!
//! The crate is organised around the resumable slice-upload engine. It is
//! a library with no global state: the host calls
//! [`Transport::initialize`] once, hands each [`CosClient`] its own
//! executor, and calls [`Transport::shutdown`] at exit.
//!
//! # Slice upload pipeline
//!
//! 1. **Check**: the source must exist and be readable (no network yet)
//! 2. **Hash**: stream the file through SHA-1 ([`cosapi_transfer::ContentHasher`])
//! 3. **Negotiate**: `upload_slice` preparation; the service either
//!    recognises the digest (dedup hit) or returns a session
//! 4. **Transfer**: send fixed-size slices from the resume offset,
//!    stopping at the first failure
//!
//! Every public operation returns an [`UploadOutcome`]; failures are never
//! retried automatically, and a failed slice upload can be resumed by
//! passing the session id back in.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod http;
pub mod metadata;
pub mod negotiate;
pub mod orchestrator;
pub mod path;
pub mod simple;
pub mod slice_loop;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience.
pub use client::CosClient;
pub use config::ClientConfig;
pub use cosapi_protocol::{FileDigest, UploadOutcome, UploadSession};
pub use error::ClientError;
pub use events::{UploadEvent, UploadPhase};
pub use executor::{
    ApiRequest, Endpoint, FormPart, Method, PartValue, RequestBody, RequestExecutor,
    TransportError,
};
pub use http::{HttpExecutor, Transport};
pub use metadata::ListOptions;
pub use negotiate::{NegotiationResult, PrepareRequest, UploadNegotiator};
pub use orchestrator::{SliceOptions, UploadOrchestrator};
pub use simple::SimpleUploader;
pub use slice_loop::SliceTransferLoop;
