//! Character encodings that backends may store text in.

use std::fmt;

use crate::errors::DecodeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CharEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, the storage encoding of the legacy engine.
    Latin1,
    /// Windows-1252, returned by many COM providers.
    Cp1252,
    Ascii,
}

// Windows-1252 code points for bytes 0x80..=0x9F. Undefined slots map to `None`.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

impl CharEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            CharEncoding::Utf8 => "UTF-8",
            CharEncoding::Latin1 => "ISO-8859-1",
            CharEncoding::Cp1252 => "CP1252",
            CharEncoding::Ascii => "ASCII",
        }
    }

    /// Decodes `bytes` into the crate's canonical UTF-8 text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            CharEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| DecodeError::UnsupportedEncoding(format!("{}: {e}", self.name()))),
            CharEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            CharEncoding::Cp1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize].ok_or_else(|| {
                        DecodeError::UnsupportedEncoding(format!(
                            "{}: undefined byte 0x{b:02X}",
                            self.name()
                        ))
                    }),
                    _ => Ok(b as char),
                })
                .collect(),
            CharEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(DecodeError::UnsupportedEncoding(format!(
                    "{}: non-ascii byte at offset {pos}",
                    self.name()
                ))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }
}

impl fmt::Display for CharEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1() {
        let bytes = [b'S', 0xE3, b'o', b' ', b'P', b'a', b'u', b'l', b'o'];
        assert_eq!(CharEncoding::Latin1.decode(&bytes).unwrap(), "São Paulo");
    }

    #[test]
    fn test_cp1252_high_range() {
        assert_eq!(CharEncoding::Cp1252.decode(&[0x80, b'5']).unwrap(), "€5");
        assert!(matches!(
            CharEncoding::Cp1252.decode(&[0x81]),
            Err(DecodeError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            CharEncoding::Utf8.decode(&[0xC3]),
            Err(DecodeError::UnsupportedEncoding(_))
        ));
        assert!(CharEncoding::Ascii.decode("ã".as_bytes()).is_err());
    }
}
