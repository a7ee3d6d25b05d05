//! Output rendering

pub mod jsonl;

pub use jsonl::render_jsonl;
