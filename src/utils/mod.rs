//! Shared helpers: safe file reading, hashing, paths, token estimates.

pub mod encoding;
pub mod hashing;
pub mod paths;
pub mod tokens;

pub use encoding::{is_binary_file, read_file_safe};
pub use hashing::{short_sha256, stable_hash};
pub use paths::normalize_path;
pub use tokens::estimate_tokens;
