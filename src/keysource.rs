//! Key material sources
//!
//! The key is the raw byte encoding of a passphrase; no hashing or
//! stretching is applied. It normally arrives through `-key`, but can also
//! be piped through stdin with `--key-stdin` to keep it out of process
//! listings and shell history.

use std::io::Read;

use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, FoldercryptError, Result};

/// Trait for obtaining key bytes from various sources
pub trait KeySource {
    /// Read the key as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the key wrapped in `Zeroizing` so it is wiped from memory
    /// when dropped.
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Key taken verbatim from a command-line argument.
pub struct ArgKeySource {
    key: Zeroizing<Vec<u8>>,
}

impl ArgKeySource {
    pub fn new(key: &str) -> Self {
        Self {
            key: Zeroizing::new(key.as_bytes().to_vec()),
        }
    }
}

impl KeySource for ArgKeySource {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.key).clone()))
    }
}

/// Reads the key from any `io::Read` source (used for `--key-stdin`).
///
/// Trailing newlines are stripped so that `echo key | foldercrypt ...`
/// behaves as expected; all other bytes pass through untouched.
pub struct ReaderKeySource {
    reader: Box<dyn Read>,
}

impl ReaderKeySource {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeySource for ReaderKeySource {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            FoldercryptError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyUnavailable,
                format!("error reading key: {}", e),
                e,
            )
        })?;
        while data.last() == Some(&b'\n') || data.last() == Some(&b'\r') {
            data.pop();
        }
        Ok(data)
    }
}

/// Returns a fixed key (for testing)
pub struct ConstantKeySource {
    key: Zeroizing<Vec<u8>>,
}

impl ConstantKeySource {
    pub fn new(key: Vec<u8>) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }
}

impl KeySource for ConstantKeySource {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.key).clone()))
    }
}
