//! Record sealing: length-hiding AES-256-GCM with slot-bound AAD.
//!
//! Every sealed value gets its own fresh 12-byte IV. Before encryption
//! the plaintext is framed as:
//!
//! ```text
//! [ plaintext | 0x00 fill up to block | u32 LE plaintext length ]
//! ```
//!
//! where `block` is 64 bytes, or the next multiple of 64 for longer
//! values. All values of up to 64 bytes therefore encrypt to the same
//! ciphertext length, and any byte sequence round-trips exactly.

use zeroize::Zeroizing;

use super::keys::EncKey;
use super::provider::{CryptoProvider, IV_LEN};
use crate::errors::{KeychainError, Result};

/// Padding block size in bytes.
pub const PAD_BLOCK: usize = 64;

/// Width of the trailing length field.
const LEN_SUFFIX: usize = 4;

/// Output of `seal`: a fresh IV and the ciphertext (tag appended).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

/// Pad `plaintext` to its block and append the length suffix.
pub fn pad(plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let len = u32::try_from(plaintext.len())
        .map_err(|_| KeychainError::Input("value exceeds u32::MAX bytes".into()))?;

    let block = plaintext.len().div_ceil(PAD_BLOCK).max(1) * PAD_BLOCK;
    let mut framed = Zeroizing::new(Vec::with_capacity(block + LEN_SUFFIX));
    framed.extend_from_slice(plaintext);
    framed.resize(block, 0);
    framed.extend_from_slice(&len.to_le_bytes());
    Ok(framed)
}

/// Strip the frame produced by `pad`.
pub fn unpad(framed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if framed.len() < LEN_SUFFIX {
        return Err(KeychainError::Input("padded value too short".into()));
    }
    let (body, suffix) = framed.split_at(framed.len() - LEN_SUFFIX);

    let mut len_bytes = [0u8; LEN_SUFFIX];
    len_bytes.copy_from_slice(suffix);
    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|_| KeychainError::Input("padded length exceeds address space".into()))?;

    if len > body.len() {
        return Err(KeychainError::Input("padded length exceeds frame".into()));
    }
    Ok(Zeroizing::new(body[..len].to_vec()))
}

/// Pad and encrypt `plaintext` under a freshly drawn IV, binding `aad`.
pub fn seal<P: CryptoProvider + ?Sized>(
    provider: &P,
    enc_key: &EncKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Sealed> {
    let mut iv = [0u8; IV_LEN];
    provider.fill_random(&mut iv)?;

    let framed = pad(plaintext)?;
    let ciphertext = provider.aead_seal(enc_key.as_bytes(), &iv, &framed, aad)?;

    Ok(Sealed { iv, ciphertext })
}

/// Decrypt, verify against `aad`, and strip the padding.
///
/// Returns `KeychainError::Auth` on any tag mismatch; never partial data.
pub fn open<P: CryptoProvider + ?Sized>(
    provider: &P,
    enc_key: &EncKey,
    iv: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let framed = Zeroizing::new(provider.aead_open(enc_key.as_bytes(), iv, ciphertext, aad)?);
    unpad(&framed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::provider::SystemCrypto;

    fn key() -> EncKey {
        EncKey::new([0x33u8; 32])
    }

    #[test]
    fn pad_short_values_to_one_block() {
        assert_eq!(pad(b"").unwrap().len(), PAD_BLOCK + LEN_SUFFIX);
        assert_eq!(pad(b"s3cr3t").unwrap().len(), PAD_BLOCK + LEN_SUFFIX);
        assert_eq!(pad(&[b'x'; 64]).unwrap().len(), PAD_BLOCK + LEN_SUFFIX);
    }

    #[test]
    fn pad_long_values_to_next_block() {
        assert_eq!(pad(&[b'x'; 65]).unwrap().len(), 2 * PAD_BLOCK + LEN_SUFFIX);
    }

    #[test]
    fn unpad_keeps_trailing_spaces_and_nuls() {
        for value in [&b"pass  "[..], &b"nul\0"[..], &b" lead"[..], &b""[..]] {
            let framed = pad(value).unwrap();
            assert_eq!(unpad(&framed).unwrap().as_slice(), value);
        }
    }

    #[test]
    fn unpad_rejects_inconsistent_length() {
        let mut framed = pad(b"abc").unwrap();
        let n = framed.len();
        framed[n - LEN_SUFFIX..].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(unpad(&framed), Err(KeychainError::Input(_))));
        assert!(matches!(unpad(&[1, 2]), Err(KeychainError::Input(_))));
    }

    #[test]
    fn ciphertext_length_hides_short_plaintext_length() {
        let a = seal(&SystemCrypto, &key(), b"a", b"aad").unwrap();
        let b = seal(&SystemCrypto, &key(), &[b'b'; 60], b"aad").unwrap();
        assert_eq!(a.ciphertext.len(), b.ciphertext.len());
    }

    #[test]
    fn each_seal_draws_a_fresh_iv() {
        let a = seal(&SystemCrypto, &key(), b"same", b"aad").unwrap();
        let b = seal(&SystemCrypto, &key(), b"same", b"aad").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn open_rejects_flipped_bit() {
        let mut sealed = seal(&SystemCrypto, &key(), b"value", b"aad").unwrap();
        sealed.ciphertext[3] ^= 0x01;
        assert!(matches!(
            open(&SystemCrypto, &key(), &sealed.iv, &sealed.ciphertext, b"aad"),
            Err(KeychainError::Auth)
        ));
    }
}
