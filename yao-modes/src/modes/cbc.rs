//! CBC (Cipher Block Chaining) mode with ciphertext stealing over the oracle

use tracing::{debug, info};

use crate::nonce;
use crate::oracle::{BlockOracle, Endpoint, OracleClient};
use crate::utils::{self, BLOCK_HEX_LEN};
use crate::{ModeError, Result};

use super::OracleModes;

impl OracleModes {
    /// CBC mode encryption with ciphertext stealing
    ///
    /// C_i = E(K, P_i ⊕ C_{i-1}) with C_0 = IV. A short final block P_n is
    /// zero-padded and chained the same way, then the last two positions of
    /// the output hold `C_n` (full width) followed by the first `len(P_n)`
    /// characters of `C_{n-1}`. The output is exactly as long as the input.
    ///
    /// At least two blocks are required; nothing is sent to the oracle
    /// otherwise. Returns the ciphertext blocks and the IV used, as hex.
    pub fn cbc_encrypt<O: BlockOracle>(
        client: &OracleClient<O>,
        plaintext: &str,
        endpoint: &Endpoint,
        iv: &str,
    ) -> Result<(Vec<String>, String)> {
        let blocks: Vec<&str> = utils::split(plaintext, BLOCK_HEX_LEN)?.collect();
        let Some((last, full)) = blocks.split_last().filter(|(_, full)| !full.is_empty()) else {
            return Err(ModeError::InsufficientDataForMode {
                blocks: blocks.len(),
            });
        };
        for block in &blocks {
            utils::check_hex(block)?;
        }
        client.config().ports.reserve(endpoint.port, blocks.len())?;

        let iv = nonce::generate(iv)?;
        info!(blocks = blocks.len(), %endpoint, "CBC encryption started");

        let mut ciphertext = Vec::with_capacity(blocks.len());
        let mut mask = hex::encode_upper(iv);
        for (i, block) in full.iter().enumerate() {
            let encrypted = Self::chain_block(client, block, &mask, endpoint, i)?;
            ciphertext.push(encrypted.clone());
            mask = encrypted;
        }

        if last.len() == BLOCK_HEX_LEN {
            ciphertext.push(Self::chain_block(client, last, &mask, endpoint, full.len())?);
        } else {
            debug!(len = last.len(), "stealing ciphertext for the short final block");
            let padded = utils::zero_pad(last);
            let encrypted = Self::chain_block(client, &padded, &mask, endpoint, full.len())?;

            // mask is C_{n-1}, which moves to the end cut down to len(P_n)
            ciphertext.pop();
            ciphertext.push(encrypted);
            ciphertext.push(mask[..last.len()].to_string());
        }

        Ok((ciphertext, hex::encode(iv)))
    }

    /// E(K, block ⊕ mask) on the port of round `index`.
    fn chain_block<O: BlockOracle>(
        client: &OracleClient<O>,
        block: &str,
        mask: &str,
        endpoint: &Endpoint,
        index: usize,
    ) -> Result<String> {
        let port = client.config().ports.port(endpoint.port, index)?;
        client.encrypt_block(&utils::xor_blocks(block, mask)?, &endpoint.at_port(port))
    }
}
