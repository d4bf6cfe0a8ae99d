//! Asset bundle: a keyed blob map serialized as a length-prefixed
//! binary map.
//!
//! Layout: `u32` entry count, then per entry `u32` key length, key bytes
//! (UTF-8 path), `u32` value length, value bytes. All integers are
//! little-endian. Decode failures carry the byte offset and a short
//! window of the surrounding input.

use std::collections::BTreeMap;

use thiserror::Error;

/// Bytes of surrounding input attached to a decode error.
const CONTEXT_WINDOW: usize = 60;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle truncated at offset {offset} (context: {context})")]
    Truncated { offset: usize, context: String },
    #[error("bundle key at offset {offset} is not UTF-8 (context: {context})")]
    BadKey { offset: usize, context: String },
}

impl BundleError {
    fn truncated(bytes: &[u8], offset: usize) -> Self {
        Self::Truncated {
            offset,
            context: context_window(bytes, offset),
        }
    }
}

fn context_window(bytes: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(CONTEXT_WINDOW / 2);
    let end = (start + CONTEXT_WINDOW).min(bytes.len());
    bytes[start.min(end)..end]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decoded bundle, keyed by asset path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Bundle {
    pub fn decode(bytes: &[u8]) -> Result<Self, BundleError> {
        let mut at = 0;
        let count = read_u32(bytes, &mut at)?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let key_offset = at;
            let key = read_blob(bytes, &mut at)?;
            let key = String::from_utf8(key.to_vec()).map_err(|_| BundleError::BadKey {
                offset: key_offset,
                context: context_window(bytes, key_offset),
            })?;
            let value = read_blob(bytes, &mut at)?;
            entries.insert(key, value.to_vec());
        }
        Ok(Self { entries })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for (key, value) in &self.entries {
            out.extend_from_slice(&(key.len() as u32).to_le_bytes());
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value);
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn read_u32(bytes: &[u8], at: &mut usize) -> Result<u32, BundleError> {
    let end = at
        .checked_add(4)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| BundleError::truncated(bytes, *at))?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*at..end]);
    *at = end;
    Ok(u32::from_le_bytes(buf))
}

fn read_blob<'a>(bytes: &'a [u8], at: &mut usize) -> Result<&'a [u8], BundleError> {
    let len = read_u32(bytes, at)? as usize;
    let end = at
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| BundleError::truncated(bytes, *at))?;
    let blob = &bytes[*at..end];
    *at = end;
    Ok(blob)
}
