use crate::errors::DecodeError;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Upper-case hex rendering of `bytes`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut rv = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        rv.push(HEX_DIGITS[(b >> 4) as usize] as char);
        rv.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
    }
    rv
}

/// Decodes pairs of hex digits (either case) into bytes.
pub fn from_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(DecodeError::malformed(format!(
            "hex input has odd length {}",
            text.len()
        )));
    }
    text.as_bytes()
        .chunks_exact(2)
        .map(|pair| Ok((_hex_nibble(pair[0])? << 4) | _hex_nibble(pair[1])?))
        .collect()
}

fn _hex_nibble(c: u8) -> Result<u8, DecodeError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(DecodeError::malformed(format!(
            "invalid hex digit '{}'",
            c as char
        ))),
    }
}
