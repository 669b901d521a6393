use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// how textual request content maps to blob bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// one byte per char, chars above U+00FF are rejected
    Binary,
    Hex,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Binary => "binary",
            Encoding::Hex => "hex",
        }
    }

    /// decode text into the bytes that get stored
    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Binary => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| Error::InvalidEncoding {
                        encoding: self.as_str(),
                        message: format!("char {:?} is outside the byte range", c),
                    })
                })
                .collect(),
            Encoding::Hex => hex::decode(text.trim()).map_err(|e| Error::InvalidEncoding {
                encoding: self.as_str(),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "binary" | "latin1" => Ok(Encoding::Binary),
            "hex" => Ok(Encoding::Hex),
            other => Err(Error::InvalidEncoding {
                encoding: "unknown",
                message: format!("unsupported encoding {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(Encoding::Utf8.decode("héllo").unwrap(), "héllo".as_bytes());
    }

    #[test]
    fn test_binary_maps_chars_to_bytes() {
        assert_eq!(Encoding::Binary.decode("h\u{e9}\u{ff}").unwrap(), vec![b'h', 0xe9, 0xff]);
        assert!(Encoding::Binary.decode("\u{100}").is_err());
    }

    #[test]
    fn test_hex() {
        assert_eq!(Encoding::Hex.decode("68656c6c6f\n").unwrap(), b"hello");
        assert!(Encoding::Hex.decode("zz").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("binary".parse::<Encoding>().unwrap(), Encoding::Binary);
        assert!("base64".parse::<Encoding>().is_err());
    }
}
