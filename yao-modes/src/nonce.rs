//! IV and counter-nonce generation

use rand::{rngs::OsRng, RngCore};
use tracing::warn;

use crate::error::{ModeError, Result};
use crate::utils::{BLOCK_BYTES, BLOCK_HEX_LEN};

/// Returns a 128-bit IV / nonce.
///
/// An empty `custom` draws 16 bytes from the operating system's CSPRNG. A
/// 32-character hex string is decoded and returned as is; any other length is
/// rejected with [`ModeError::InvalidCustomValue`].
///
/// Supplying the same custom value to two operations under the same key
/// reuses the randomness of the first one. That breaks CTR confidentiality
/// outright and leaks equal prefixes in CBC; it is meant for test vectors.
pub fn generate(custom: &str) -> Result<[u8; BLOCK_BYTES]> {
    if custom.is_empty() {
        let mut iv = [0u8; BLOCK_BYTES];
        OsRng.fill_bytes(&mut iv);
        return Ok(iv);
    }

    if custom.len() != BLOCK_HEX_LEN {
        return Err(ModeError::InvalidCustomValue { len: custom.len() });
    }

    warn!("using a caller supplied IV; reusing it across operations is dangerous");
    let mut iv = [0u8; BLOCK_BYTES];
    hex::decode_to_slice(custom, &mut iv)?;
    Ok(iv)
}
