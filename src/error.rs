use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to the user's
    /// input or environment.
    ///
    /// Use of Internal is never a guarantee the error is not, for example,
    /// due to a user error - merely that the code cannot confidently tell.
    Internal,

    /// The user provided invalid input or asked for an operation that is
    /// impossible to complete (bad flags, bad key, missing source tree).
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Command-line arguments were missing or malformed.
    Usage,
    /// The key byte length is not one accepted by AES (16, 24 or 32).
    InvalidKeySize,
    /// Decryption produced invalid PKCS#7 padding, or the ciphertext length
    /// is not a multiple of the cipher block size. Almost always a wrong key
    /// or corrupted ciphertext.
    InvalidPadding,
    /// The source path does not exist.
    SourceMissing,
    /// The source path exists but is not a directory.
    SourceNotDirectory,
    /// The source directory contains no entries at all.
    SourceEmpty,
    /// The destination root could not be reset or created.
    DestinationUnusable,
    /// Key material could not be obtained from the configured source.
    KeyUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct FoldercryptError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl FoldercryptError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FoldercryptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_preserves_kind_and_source() {
        let inner = FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidPadding,
            "bad padding",
        );
        let wrapped = inner.with_context("failed to decrypt a.txt");

        assert_eq!(wrapped.category, ErrorCategory::User);
        assert_eq!(wrapped.kind, Some(ErrorKind::InvalidPadding));
        assert_eq!(wrapped.message(), "failed to decrypt a.txt");
        assert!(wrapped.source_error().is_some());
    }

    #[test]
    fn test_display_uses_message() {
        let err = FoldercryptError::new(ErrorCategory::Internal, "something broke");
        assert_eq!(err.to_string(), "something broke");
    }
}
