//! Repository scanning and workspace extraction

pub mod extract;
pub mod scanner;

pub use extract::extract_relevant_files;
pub use scanner::FileScanner;
