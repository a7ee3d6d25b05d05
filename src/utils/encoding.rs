//! Text file reading with BOM sniffing and a charset-detection fallback.
//!
//! Workspace files come from arbitrary repositories, so a single file in a
//! legacy encoding must degrade to replacement characters instead of failing
//! the ingestion run.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Read a whole file as text.
///
/// Order: BOM → strict UTF-8 → chardetng guess → lossy UTF-8.
/// Returns `(content, encoding_label)`.
pub fn read_file_safe(path: &Path) -> Result<(String, String)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    if let Some((encoding, bom_len)) = Encoding::for_bom(&bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Ok((decoded.into_owned(), encoding.name().to_lowercase()));
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok((content, "utf-8".to_string())),
        Err(err) => {
            let bytes = err.into_bytes();
            let mut detector = EncodingDetector::new();
            detector.feed(&bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)], true);
            let encoding = detector.guess(None, true);
            let (decoded, _, had_errors) = encoding.decode(&bytes);
            if had_errors {
                tracing::debug!(
                    "Replacement characters while decoding {} as {}",
                    path.display(),
                    encoding.name()
                );
            }
            Ok((decoded.into_owned(), encoding.name().to_lowercase()))
        }
    }
}

/// Detect if a file is binary from its first `sample_size` bytes: any NUL
/// byte means binary, valid UTF-8 (a sequence cut off by the sample end
/// included) means text, anything else is binary under 70% printable ASCII.
/// Unreadable files count as binary.
pub fn is_binary_file(path: &Path, sample_size: usize) -> bool {
    let mut sample = vec![0u8; sample_size];
    let read = File::open(path).and_then(|mut file| file.read(&mut sample));
    let Ok(bytes_read) = read else {
        return true;
    };
    sample.truncate(bytes_read);
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(&sample) {
        Ok(_) => return false,
        Err(err) if err.error_len().is_none() => return false,
        Err(_) => {}
    }
    let printable = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
        .count();
    (printable as f64 / sample.len() as f64) < 0.70
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_utf8_with_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xef, 0xbb, 0xbf]).unwrap();
        file.write_all("<definitions/>".as_bytes()).unwrap();
        file.flush().unwrap();

        let (content, encoding) = read_file_safe(file.path()).unwrap();
        assert_eq!(content, "<definitions/>");
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn reads_plain_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("Test content 🚀".as_bytes()).unwrap();
        file.flush().unwrap();

        let (content, encoding) = read_file_safe(file.path()).unwrap();
        assert_eq!(content, "Test content 🚀");
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn latin1_bytes_do_not_fail() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9 au lait").unwrap();
        file.flush().unwrap();

        let (content, _) = read_file_safe(file.path()).unwrap();
        assert!(content.starts_with("caf"));
        assert!(content.ends_with("au lait"));
    }

    #[test]
    fn null_bytes_mean_binary() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x00, 0x01, 0x02]).unwrap();
        file.flush().unwrap();
        assert!(is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
    }

    #[test]
    fn non_latin_utf8_is_text() {
        let mut file = NamedTempFile::new().unwrap();
        let label = "Проверить заказ и отправить клиенту 注文を確認する ";
        write!(file, "<bpmn:task id=\"check\" name=\"{}\"/>", label.repeat(20)).unwrap();
        file.flush().unwrap();
        assert!(!is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
        // A sample boundary inside a multi-byte character is still text.
        assert!(!is_binary_file(file.path(), 41));
    }

    #[test]
    fn undecodable_high_bytes_are_binary() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x80, 0x81, 0x90, 0xc0, b'a', 0xf5, 0x99, 0x9a]).unwrap();
        file.flush().unwrap();
        assert!(is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
    }

    #[test]
    fn text_is_not_binary() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("def main():\n    pass\n".as_bytes()).unwrap();
        file.flush().unwrap();
        assert!(!is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
    }
}
