//! Stable identifiers for localized text and other content keys.
//!
//! A [`TextId`] is a UUID that encodes as its 16 raw bytes. Decoders also
//! accept the 36-character hyphenated text form so that content written by
//! older tooling keeps loading.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Key into the text table (and any other UUID-addressed content).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextId(pub Uuid);

impl TextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for TextId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for TextId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Serialize for TextId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0.as_bytes())
    }
}

struct TextIdVisitor;

impl<'de> Visitor<'de> for TextIdVisitor {
    type Value = TextId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("16 UUID bytes or a 36-character UUID string")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<TextId, E> {
        match v.len() {
            16 => {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(v);
                Ok(TextId(Uuid::from_bytes(raw)))
            },
            36 => {
                let text = std::str::from_utf8(v).map_err(E::custom)?;
                self.visit_str(text)
            },
            n => Err(E::invalid_length(n, &self)),
        }
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<TextId, E> {
        self.visit_bytes(&v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TextId, E> {
        Uuid::parse_str(v).map(TextId).map_err(E::custom)
    }

    // Human-readable formats (serde_json) represent the raw bytes as a
    // sequence of integers.
    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<TextId, A::Error> {
        let mut raw = Vec::with_capacity(16);
        while let Some(byte) = seq.next_element::<u8>()? {
            raw.push(byte);
        }
        self.visit_bytes(&raw)
    }
}

impl<'de> Deserialize<'de> for TextId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TextIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_16_raw_bytes() {
        let id = TextId(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap());
        let bytes = rmp_serde::to_vec(&id).unwrap();
        // msgpack bin8 header (0xc4) + length 16 + payload
        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[2..], id.0.as_bytes());
    }

    #[test]
    fn binary_roundtrip() {
        let id = TextId::new();
        let bytes = rmp_serde::to_vec(&id).unwrap();
        let back: TextId = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn accepts_text_form_as_bytes() {
        let text = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let bytes = rmp_serde::to_vec(&serde_bytes_wrapper(text.as_bytes())).unwrap();
        let back: TextId = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back.0, Uuid::parse_str(text).unwrap());
    }

    #[test]
    fn accepts_plain_string() {
        let text = "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"";
        let back: TextId = serde_json::from_str(text).unwrap();
        assert_eq!(back.0.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn rejects_wrong_length() {
        let bytes = rmp_serde::to_vec(&serde_bytes_wrapper(&[1, 2, 3])).unwrap();
        assert!(rmp_serde::from_slice::<TextId>(&bytes).is_err());
    }

    /// Serialize a raw byte slice as msgpack bin, without pulling in serde_bytes.
    fn serde_bytes_wrapper(raw: &[u8]) -> impl Serialize + '_ {
        struct Raw<'a>(&'a [u8]);
        impl Serialize for Raw<'_> {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_bytes(self.0)
            }
        }
        Raw(raw)
    }
}
