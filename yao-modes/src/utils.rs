//! Hex block helpers shared by every mode

use crate::error::{ModeError, Result};

/// Width of one AES-128 block in bytes.
pub const BLOCK_BYTES: usize = 16;

/// Width of one AES-128 block in hex characters.
pub const BLOCK_HEX_LEN: usize = 2 * BLOCK_BYTES;

/// Reverse the byte order of a hex string.
///
/// Two-character groups are emitted from the tail towards the head, so
/// `"DEC0ADDE00"` becomes `"00DEADC0DE"`. Applying it twice is the identity.
/// The oracle works in little-endian order while the engines work in
/// big-endian order; this is the only conversion between the two.
pub fn reverse_endianness(data: &str) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(ModeError::MalformedHexInput(format!(
            "cannot reverse the byte order of {} characters (odd length)",
            data.len()
        )));
    }
    if !data.is_ascii() {
        return Err(ModeError::MalformedHexInput(
            "non-ASCII characters in hex string".to_string(),
        ));
    }

    Ok(data
        .as_bytes()
        .rchunks(2)
        .flat_map(|pair| pair.iter().map(|&c| c as char))
        .collect())
}

/// XOR two hex strings up to the shorter of the two, returning uppercase hex.
pub fn xor_blocks(a: &str, b: &str) -> Result<String> {
    let a = hex::decode(a)?;
    let b = hex::decode(b)?;

    let xored: Vec<u8> = a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect();
    Ok(hex::encode_upper(xored))
}

/// Fails unless `data` is whole bytes of hex digits.
pub fn check_hex(data: &str) -> Result<()> {
    if data.len() % 2 != 0 {
        return Err(ModeError::MalformedHexInput(format!(
            "{} hex characters is not a whole number of bytes",
            data.len()
        )));
    }
    match data.bytes().position(|c| !c.is_ascii_hexdigit()) {
        Some(at) => Err(ModeError::MalformedHexInput(format!(
            "non-hex character at position {at}"
        ))),
        None => Ok(()),
    }
}

/// Right-pad a hex block with `'0'` up to a full block.
pub fn zero_pad(block: &str) -> String {
    format!("{block:0<width$}", width = BLOCK_HEX_LEN)
}

/// Split a hex payload into blocks of `block_size` characters.
///
/// The final block holds the remainder. The returned iterator is lazy and can
/// be cloned to walk the payload again.
pub fn split(payload: &str, block_size: usize) -> Result<Blocks<'_>> {
    if block_size == 0 {
        return Err(ModeError::InvalidBlockSize);
    }
    if !payload.is_ascii() {
        return Err(ModeError::MalformedHexInput(
            "non-ASCII characters in payload".to_string(),
        ));
    }

    Ok(Blocks {
        rest: payload,
        block_size,
    })
}

/// Iterator over the blocks of a payload, see [`split`].
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    rest: &'a str,
    block_size: usize,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        // payload is ASCII, so every index is a char boundary
        let at = self.block_size.min(self.rest.len());
        let (block, rest) = self.rest.split_at(at);
        self.rest = rest;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.len().div_ceil(self.block_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Blocks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_reverse_endianness() {
        assert_eq!(reverse_endianness("DEC0ADDE00").unwrap(), "00DEADC0DE");
        assert_eq!(reverse_endianness("A0B70708").unwrap(), "0807B7A0");
        assert_eq!(reverse_endianness("").unwrap(), "");
    }

    #[test]
    fn test_reverse_endianness_is_involution() {
        for s in ["2b7e151628aed2a6abf7158809cf4f3c", "ab", "0011223344", "ffEE"] {
            let twice = reverse_endianness(&reverse_endianness(s).unwrap()).unwrap();
            assert_eq!(twice, s);
        }
    }

    /// Random hex of `chars` characters with randomly mixed case.
    fn random_hex(rng: &mut impl Rng, chars: usize) -> String {
        let bytes: Vec<u8> = (0..chars / 2).map(|_| rng.gen()).collect();
        hex::encode(bytes)
            .chars()
            .map(|c| if rng.gen() { c.to_ascii_uppercase() } else { c })
            .collect()
    }

    #[test]
    fn test_reverse_endianness_random_inputs() {
        let mut rng = rand::thread_rng();
        for chars in (0..=64).step_by(2) {
            let s = random_hex(&mut rng, chars);
            let reversed = reverse_endianness(&s).unwrap();

            let mut bytes = hex::decode(&s).unwrap();
            bytes.reverse();
            assert_eq!(reversed.to_lowercase(), hex::encode(bytes));
            assert_eq!(reverse_endianness(&reversed).unwrap(), s);
        }
    }

    #[test]
    fn test_reverse_endianness_odd_length() {
        let result = reverse_endianness("ABC");
        assert!(matches!(result, Err(ModeError::MalformedHexInput(_))));
    }

    #[test]
    fn test_xor_blocks() {
        assert_eq!(xor_blocks("DEADC0DE", "DEADC0DE").unwrap(), "00000000");
        assert_eq!(xor_blocks("ee2eee1ff1", "fffffffffe").unwrap(), "11D111E00F");
        assert_eq!(xor_blocks("00000000", "DEADC0DE").unwrap(), "DEADC0DE");
    }

    #[test]
    fn test_xor_blocks_shorter_wins() {
        assert_eq!(xor_blocks("ffff", "0f0f0f0f").unwrap(), "F0F0");
        assert_eq!(xor_blocks("0f0f0f0f", "ffff").unwrap(), "F0F0");
    }

    #[test]
    fn test_xor_blocks_twice_restores() {
        let a = "6bc1bee22e409f96e93d7e117393172a";
        let b = "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff";
        let back = xor_blocks(&xor_blocks(a, b).unwrap(), b).unwrap();
        assert_eq!(back, a.to_uppercase());
    }

    #[test]
    fn test_xor_blocks_random_inputs() {
        let mut rng = rand::thread_rng();
        for chars in (0..=64).step_by(2) {
            let a = random_hex(&mut rng, chars);
            let b = random_hex(&mut rng, chars);

            let once = xor_blocks(&a, &b).unwrap();
            assert_eq!(once, once.to_uppercase());
            assert_eq!(once, xor_blocks(&b, &a).unwrap());
            assert_eq!(xor_blocks(&once, &b).unwrap(), a.to_uppercase());
            assert_eq!(xor_blocks(&a, &a).unwrap(), "0".repeat(chars));
        }
    }

    #[test]
    fn test_xor_blocks_rejects_bad_hex() {
        assert!(matches!(
            xor_blocks("zz", "00"),
            Err(ModeError::MalformedHexInput(_))
        ));
        assert!(matches!(
            xor_blocks("000", "00"),
            Err(ModeError::MalformedHexInput(_))
        ));
    }

    #[test]
    fn test_check_hex() {
        assert!(check_hex("00aaFF").is_ok());
        assert!(check_hex("").is_ok());
        assert!(check_hex("abc").is_err());
        assert!(check_hex("0g").is_err());
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad("ab"), format!("ab{}", "0".repeat(30)));
        assert_eq!(zero_pad(&"1".repeat(32)), "1".repeat(32));
    }

    #[test]
    fn test_split_reassembles() {
        let payload = "0123456789abcdef".repeat(5);
        for size in [1, 3, 16, 32, 80, 100] {
            let blocks: Vec<&str> = split(&payload, size).unwrap().collect();
            assert_eq!(blocks.concat(), payload);
            assert!(blocks.iter().all(|b| b.len() <= size));
        }
    }

    #[test]
    fn test_split_remainder() {
        let payload = "a".repeat(70);
        let blocks: Vec<&str> = split(&payload, 32).unwrap().collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].len(), 6);

        let even = "b".repeat(64);
        let blocks: Vec<&str> = split(&even, 32).unwrap().collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].len(), 32);
    }

    #[test]
    fn test_split_is_restartable() {
        let blocks = split("aabbccdd", 4).unwrap();
        assert_eq!(blocks.len(), 2);
        let first: Vec<&str> = blocks.clone().collect();
        let second: Vec<&str> = blocks.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_empty_and_invalid() {
        assert_eq!(split("", 32).unwrap().count(), 0);
        assert!(matches!(split("abcd", 0), Err(ModeError::InvalidBlockSize)));
        assert!(matches!(
            split("ab\u{e9}", 2),
            Err(ModeError::MalformedHexInput(_))
        ));
    }
}
