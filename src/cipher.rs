//! Whole-buffer encryption/decryption using AES in ECB mode
//!
//! The transformation is AES/ECB with PKCS#7 padding, matching the format
//! of already-encrypted trees. The passphrase bytes are used directly as
//! the AES key (no key derivation), so the key must be exactly 16, 24 or
//! 32 bytes long.
//!
//! ECB encrypts each 16-byte block independently: repeated plaintext blocks
//! produce repeated ciphertext blocks, and there is no integrity check. This
//! is kept for compatibility with existing encrypted trees; anything that does
//! not need that compatibility should use an authenticated mode such as
//! AES-GCM with a random nonce instead.

use std::fmt;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, FoldercryptError, Result};

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Direction of the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    /// Suffix appended to the `outputs_` destination directory name.
    pub fn suffix(&self) -> &'static str {
        match self {
            Mode::Encrypt => "_encrypted",
            Mode::Decrypt => "_decrypted",
        }
    }

    /// Terminal message printed once every file has been attempted.
    pub fn done_message(&self) -> &'static str {
        match self {
            Mode::Encrypt => "Encryption done successfully!",
            Mode::Decrypt => "Decryption done successfully!",
        }
    }
}

/// Seam between the tree walker and the concrete cipher.
///
/// The walker only ever sees this trait, so tests (and any future algorithm
/// swap) can substitute their own transform without touching traversal code.
pub trait CipherTransform {
    /// Transforms an entire buffer in one call. Padding is added on encrypt
    /// and stripped on decrypt.
    fn apply(&self, mode: Mode, data: &[u8]) -> Result<Vec<u8>>;
}

/// AES/ECB/PKCS#7 over a raw passphrase-byte key.
///
/// The AES variant is picked from the key length at construction time.
pub struct AesEcb {
    key: Zeroizing<Vec<u8>>,
}

impl AesEcb {
    /// Builds a cipher from raw key bytes.
    ///
    /// Fails with [`ErrorKind::InvalidKeySize`] unless the key is 16, 24 or
    /// 32 bytes long.
    pub fn new(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 | 24 | 32 => Ok(Self {
                key: Zeroizing::new(key.to_vec()),
            }),
            n => Err(FoldercryptError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKeySize,
                format!("invalid AES key size: {} bytes (expected 16, 24 or 32)", n),
            )),
        }
    }
}

// Key bytes never appear in debug output.
impl fmt::Debug for AesEcb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesEcb")
            .field("key", &format_args!("<{} bytes redacted>", self.key.len()))
            .finish()
    }
}

impl CipherTransform for AesEcb {
    fn apply(&self, mode: Mode, data: &[u8]) -> Result<Vec<u8>> {
        match (self.key.len(), mode) {
            (16, Mode::Encrypt) => ecb_encrypt::<Aes128>(&self.key, data),
            (24, Mode::Encrypt) => ecb_encrypt::<Aes192>(&self.key, data),
            (32, Mode::Encrypt) => ecb_encrypt::<Aes256>(&self.key, data),
            (16, Mode::Decrypt) => ecb_decrypt::<Aes128>(&self.key, data),
            (24, Mode::Decrypt) => ecb_decrypt::<Aes192>(&self.key, data),
            (32, Mode::Decrypt) => ecb_decrypt::<Aes256>(&self.key, data),
            // Unreachable: new() rejects all other lengths.
            (n, _) => Err(FoldercryptError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InvalidKeySize,
                format!("cipher constructed with unsupported key size: {}", n),
            )),
        }
    }
}

fn ecb_encrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let enc = ecb::Encryptor::<C>::new_from_slice(key).map_err(|e| {
        FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidKeySize,
            format!("failed to initialize AES: {}", e),
        )
    })?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(data))
}

fn ecb_decrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let dec = ecb::Decryptor::<C>::new_from_slice(key).map_err(|e| {
        FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidKeySize,
            format!("failed to initialize AES: {}", e),
        )
    })?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(data).map_err(|_| {
        FoldercryptError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidPadding,
            "invalid padding: wrong key or corrupted ciphertext",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nist_aes128_ecb_vector() {
        // NIST SP 800-38A, F.1.1 ECB-AES128.Encrypt, block #1.
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let expected_block = hex::decode("3ad77bb40d7a3660a89ecaf32466ef97").unwrap();

        let cipher = AesEcb::new(&key).unwrap();
        let ciphertext = cipher.apply(Mode::Encrypt, &plaintext).unwrap();

        // One data block plus one full PKCS#7 padding block.
        assert_eq!(ciphertext.len(), 2 * BLOCK_LEN);
        assert_eq!(&ciphertext[..BLOCK_LEN], &expected_block[..]);

        let decrypted = cipher.apply(Mode::Decrypt, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_nist_aes256_ecb_vector() {
        // NIST SP 800-38A, F.1.5 ECB-AES256.Encrypt, block #1.
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let expected_block = hex::decode("f3eed1bdb5d2a03c064b5a7e3db181f8").unwrap();

        let cipher = AesEcb::new(&key).unwrap();
        let ciphertext = cipher.apply(Mode::Encrypt, &plaintext).unwrap();
        assert_eq!(&ciphertext[..BLOCK_LEN], &expected_block[..]);
    }

    #[test]
    fn test_roundtrip_all_key_sizes() {
        let plaintext = b"The quick brown fox jumps over the lazy dog";
        for key_len in [16, 24, 32] {
            let key = vec![0x42u8; key_len];
            let cipher = AesEcb::new(&key).unwrap();
            let ciphertext = cipher.apply(Mode::Encrypt, plaintext).unwrap();
            assert_ne!(&ciphertext[..], &plaintext[..]);
            let decrypted = cipher.apply(Mode::Decrypt, &ciphertext).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn test_pkcs7_length() {
        let cipher = AesEcb::new(&[0u8; 16]).unwrap();
        for len in 0..48 {
            let plaintext = vec![0xAAu8; len];
            let ciphertext = cipher.apply(Mode::Encrypt, &plaintext).unwrap();
            // Rounded up to the next block, always at least one padding byte.
            assert_eq!(ciphertext.len(), (len / BLOCK_LEN + 1) * BLOCK_LEN);
        }
    }

    #[test]
    fn test_invalid_key_size() {
        for key_len in [0, 1, 15, 17, 23, 31, 33, 64] {
            let err = AesEcb::new(&vec![0u8; key_len]).unwrap_err();
            assert_eq!(err.kind, Some(ErrorKind::InvalidKeySize));
            assert_eq!(err.category, ErrorCategory::User);
        }
    }

    #[test]
    fn test_debug_output_redacts_key() {
        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();
        let rendered = format!("{:?}", cipher);
        assert!(rendered.contains("16 bytes redacted"));
        assert!(!rendered.contains("0123456789abcdef"));
    }

    #[test]
    fn test_decrypt_partial_block_fails() {
        let cipher = AesEcb::new(b"0123456789abcdef").unwrap();
        let err = cipher.apply(Mode::Decrypt, &[0u8; 21]).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidPadding));
    }

    #[test]
    fn test_decrypt_with_wrong_key() {
        let plaintext = b"secret data that should not survive a wrong key";
        let ciphertext = AesEcb::new(b"0123456789abcdef")
            .unwrap()
            .apply(Mode::Encrypt, plaintext)
            .unwrap();

        // Without authentication a wrong key either trips the padding check
        // or yields garbage; it must never reproduce the plaintext.
        match AesEcb::new(b"fedcba9876543210")
            .unwrap()
            .apply(Mode::Decrypt, &ciphertext)
        {
            Ok(garbage) => assert_ne!(garbage, plaintext),
            Err(err) => assert_eq!(err.kind, Some(ErrorKind::InvalidPadding)),
        }
    }

    #[test]
    fn test_ecb_repeats_identical_blocks() {
        // The documented ECB weakness: equal plaintext blocks map to equal
        // ciphertext blocks. The compatibility behavior relies on it.
        let cipher = AesEcb::new(&[7u8; 16]).unwrap();
        let plaintext = [0x11u8; 2 * BLOCK_LEN];
        let ciphertext = cipher.apply(Mode::Encrypt, &plaintext).unwrap();
        assert_eq!(&ciphertext[..BLOCK_LEN], &ciphertext[BLOCK_LEN..2 * BLOCK_LEN]);
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = AesEcb::new(&[1u8; 32]).unwrap();
        let ciphertext = cipher.apply(Mode::Encrypt, b"").unwrap();
        assert_eq!(ciphertext.len(), BLOCK_LEN);
        let decrypted = cipher.apply(Mode::Decrypt, &ciphertext).unwrap();
        assert_eq!(decrypted, b"");
    }

    #[test]
    fn test_all_byte_values() {
        let cipher = AesEcb::new(&[9u8; 24]).unwrap();
        let plaintext: Vec<u8> = (0..=255).collect();
        let ciphertext = cipher.apply(Mode::Encrypt, &plaintext).unwrap();
        let decrypted = cipher.apply(Mode::Decrypt, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }
}
