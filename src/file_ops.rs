//! Single-file cipher operations
//!
//! Reads a whole file into memory, applies the cipher in one call, and
//! writes the result, truncating any previous content at the destination.
//! Whole-file buffering is a design limit: memory use is proportional to
//! the largest file in the tree.

use std::fs;
use std::io;
use std::path::Path;

use crate::cipher::{CipherTransform, Mode};
use crate::error::{ErrorCategory, ErrorKind, FoldercryptError, Result};

/// Transform one regular file from `input_path` to `output_path`.
///
/// All failure modes (unreadable input, cipher failure, unwritable output)
/// come back as a single error value so the caller can apply its
/// skip-and-log policy per file. File handles are dropped on every exit
/// path.
pub fn transform_file(
    cipher: &dyn CipherTransform,
    mode: Mode,
    input_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let input = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let output = cipher
        .apply(mode, &input)
        .map_err(|e| e.with_context(format!("cipher failed on {}", input_path.display())))?;
    fs::write(output_path, &output).map_err(|e| {
        FoldercryptError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to write to {}", output_path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> FoldercryptError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    FoldercryptError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::AesEcb;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("crypt.txt");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        let plaintext = b"Hello, foldercrypt!";
        fs::write(&plain_path, plaintext).unwrap();

        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();
        transform_file(&cipher, Mode::Encrypt, &plain_path, &crypt_path).unwrap();
        assert!(crypt_path.exists());
        assert_ne!(fs::read(&crypt_path).unwrap(), plaintext);

        transform_file(&cipher, Mode::Decrypt, &crypt_path, &decrypted_path).unwrap();
        assert_eq!(fs::read(&decrypted_path).unwrap(), plaintext);
    }

    #[test]
    fn test_output_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("crypt.txt");

        fs::write(&plain_path, b"short").unwrap();
        fs::write(&crypt_path, vec![0u8; 4096]).unwrap();

        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();
        transform_file(&cipher, Mode::Encrypt, &plain_path, &crypt_path).unwrap();

        // Fully replaced, not appended or partially overwritten.
        assert_eq!(fs::read(&crypt_path).unwrap().len(), 16);
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();

        let err = transform_file(
            &cipher,
            Mode::Encrypt,
            &temp_dir.path().join("nonexistent"),
            &temp_dir.path().join("out"),
        )
        .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::Io));
    }

    #[test]
    fn test_decrypt_garbage_reports_padding_error() {
        let temp_dir = TempDir::new().unwrap();
        let garbage_path = temp_dir.path().join("garbage");
        fs::write(&garbage_path, b"definitely not a block multiple").unwrap();

        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();
        let err = transform_file(
            &cipher,
            Mode::Decrypt,
            &garbage_path,
            &temp_dir.path().join("out"),
        )
        .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidPadding));
    }
}
