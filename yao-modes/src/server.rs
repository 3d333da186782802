//! Multi-round oracle server
//!
//! The key holder serves one oracle round per client block. Rounds are
//! stateless apart from the round counter, which only this loop touches.

use tracing::info;

use crate::config::OracleConfig;
use crate::error::{ModeError, Result};
use crate::port::PortAllocator;
use crate::tinygarble::TinyGarbleServer;
use crate::utils::{check_hex, reverse_endianness, BLOCK_HEX_LEN};

/// Runs the server side of a single oracle round and blocks until it ends.
pub trait ServerRole {
    fn serve_round(&self, native_key: &str, port: u16) -> Result<()>;
}

impl<T: ServerRole + ?Sized> ServerRole for &T {
    fn serve_round(&self, native_key: &str, port: u16) -> Result<()> {
        (**self).serve_round(native_key, port)
    }
}

pub struct OracleServer<R> {
    role: R,
    ports: PortAllocator,
}

impl OracleServer<TinyGarbleServer> {
    pub fn tinygarble(config: &OracleConfig) -> Self {
        Self::new(TinyGarbleServer::new(config.clone()), config.ports)
    }
}

impl<R: ServerRole> OracleServer<R> {
    pub fn new(role: R, ports: PortAllocator) -> Self {
        Self { role, ports }
    }

    /// Serves oracle rounds with `key` (big-endian hex, 32 characters).
    ///
    /// Round `i` is bound to the allocator's port for `starting_port` and `i`.
    /// A negative `rounds` serves until a round fails, `0` returns at once and
    /// a positive value serves exactly that many rounds. Returns the number of
    /// rounds served.
    pub fn serve(&self, key: &str, starting_port: u16, rounds: i64) -> Result<u64> {
        if key.len() != BLOCK_HEX_LEN {
            return Err(ModeError::MalformedHexInput(format!(
                "AES-128 keys are {BLOCK_HEX_LEN} hex characters, got {}",
                key.len()
            )));
        }
        check_hex(key)?;
        let native_key = reverse_endianness(key)?;
        let mut remaining = rounds;
        let mut round_index = 0usize;
        let mut served = 0u64;

        while remaining != 0 {
            let port = self.ports.port(starting_port, round_index)?;
            info!(round = round_index, port, "serving oracle round");
            self.role.serve_round(&native_key, port)?;

            served += 1;
            round_index = round_index.wrapping_add(1);
            if remaining > 0 {
                remaining -= 1;
            }
        }

        info!(served, "oracle server finished");
        Ok(served)
    }
}
