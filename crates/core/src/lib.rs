pub mod group;
pub mod outcome;
pub mod sanitize;
pub mod types;
pub mod upload;

pub use group::{FileGroup, NewFileGroup};
pub use outcome::ResolveOutcome;
pub use sanitize::{sanitize_filename, storage_key};
pub use types::FileGroupId;
pub use upload::{UploadLimits, UploadedFile, ValidationError};
