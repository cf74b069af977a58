pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{ListPattern, Op};
pub use envelope::ApiResponse;
pub use types::{FileDigest, InvalidSession, UploadOutcome, UploadSession};
