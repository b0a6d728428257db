//! "Private share": obfuscate the page and quick notes with a shared key.
//!
//! This is a repeating-key XOR wrapped in base64. It keeps casual eyes off
//! a pasted blob and nothing more; it is not encryption.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local, TimeZone, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of keys from [`generate_share_key`]
pub const SHARE_KEY_LEN: usize = 12;

/// Shown instead of an error when data or key is wrong
pub const INVALID_SHARE: &str = "Invalid encrypted data or key";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share key must not be empty")]
    EmptyKey,
    #[error("shared data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("decoded data is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("could not encode share payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What gets shared: both texts and when they were shared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub content: String,
    pub quick_notes: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A random alphanumeric key of [`SHARE_KEY_LEN`] characters
pub fn generate_share_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_KEY_LEN)
        .map(char::from)
        .collect()
}

fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

pub fn encrypt(text: &str, key: &str) -> Result<String, ShareError> {
    if key.is_empty() {
        return Err(ShareError::EmptyKey);
    }
    Ok(STANDARD.encode(xor(text.as_bytes(), key.as_bytes())))
}

pub fn decrypt(data: &str, key: &str) -> Result<String, ShareError> {
    if key.is_empty() {
        return Err(ShareError::EmptyKey);
    }
    let bytes = STANDARD.decode(data.trim())?;
    Ok(String::from_utf8(xor(&bytes, key.as_bytes()))?)
}

/// Encrypt the page and notes as a [`SharePayload`]
pub fn share(content: &str, quick_notes: &str, now: DateTime<Utc>, key: &str) -> Result<String, ShareError> {
    let payload = SharePayload {
        content: content.to_string(),
        quick_notes: quick_notes.to_string(),
        timestamp: now,
    };
    encrypt(&serde_json::to_string(&payload)?, key)
}

/// Human-readable result of opening a share. Never fails: undecodable input
/// yields [`INVALID_SHARE`], text that is not a payload is returned as is.
pub fn open_share(data: &str, key: &str) -> String {
    open_share_in(data, key, &Local)
}

/// [`open_share`] with the "Shared:" time rendered in `tz`
pub fn open_share_in<Tz>(data: &str, key: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let text = match decrypt(data, key) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("share did not open: {}", e);
            return INVALID_SHARE.to_string();
        }
    };
    match serde_json::from_str::<SharePayload>(&text) {
        Ok(p) => format!(
            "Content:\n{}\n\nQuick Notes:\n{}\n\nShared: {}",
            p.content,
            p.quick_notes,
            p.timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M:%S")
        ),
        Err(_) => text,
    }
}
