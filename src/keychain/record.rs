//! The encrypted record stored in each table slot.
//!
//! A record carries two independently sealed values: the password and
//! the human-readable domain label. Byte fields use serde helpers so
//! they serialize as base64 strings in JSON.

use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_decode_opt, base64_encode, base64_encode_opt};
use crate::crypto::Sealed;

/// One encrypted entry of the keychain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// IV of the password ciphertext.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    /// Padded password, sealed with the slot's blind index as AAD.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// IV of the label ciphertext. Absent for entries written without a label.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    pub label_iv: Option<Vec<u8>>,

    /// Padded domain label, sealed like the password.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    pub label_ciphertext: Option<Vec<u8>>,
}

impl Record {
    /// Assemble a record from its sealed password and sealed label.
    pub fn new(password: Sealed, label: Sealed) -> Self {
        Self {
            iv: password.iv.to_vec(),
            ciphertext: password.ciphertext,
            label_iv: Some(label.iv.to_vec()),
            label_ciphertext: Some(label.ciphertext),
        }
    }

    /// The label IV and ciphertext, if both are present.
    pub fn label(&self) -> Option<(&[u8], &[u8])> {
        match (&self.label_iv, &self.label_ciphertext) {
            (Some(iv), Some(ct)) => Some((iv.as_slice(), ct.as_slice())),
            _ => None,
        }
    }
}
