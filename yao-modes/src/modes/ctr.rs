//! CTR (Counter) mode over the oracle

use tracing::info;

use crate::nonce;
use crate::oracle::{BlockOracle, Endpoint, OracleClient};
use crate::utils::{self, BLOCK_BYTES, BLOCK_HEX_LEN};
use crate::{ModeError, Result};

use super::OracleModes;

impl OracleModes {
    /// CTR mode encryption
    ///
    /// The 128-bit counter is split into a fixed high half and a low half that
    /// is incremented per block, wrapping on overflow:
    /// 1. T_i = iv_high || (iv_low + i mod 2^64)
    /// 2. C_i = P_i ⊕ E(K, T_i)
    ///
    /// Block `i` is encrypted on the allocator's port for round `i`. Returns
    /// the ciphertext blocks and the counter used, as hex. `iv` may be empty
    /// for a random counter.
    ///
    /// Never encrypt two different plaintexts under the same key and `iv`:
    /// the keystreams are identical and XOR of the ciphertexts gives away the
    /// XOR of the plaintexts.
    pub fn ctr_encrypt<O: BlockOracle>(
        client: &OracleClient<O>,
        plaintext: &str,
        endpoint: &Endpoint,
        iv: &str,
    ) -> Result<(Vec<String>, String)> {
        let blocks: Vec<&str> = utils::split(plaintext, BLOCK_HEX_LEN)?.collect();
        for block in &blocks {
            utils::check_hex(block)?;
        }
        client.config().ports.reserve(endpoint.port, blocks.len())?;

        let counter = nonce::generate(iv)?;
        let counters = Self::counter_blocks(&counter, blocks.len());
        info!(blocks = blocks.len(), %endpoint, "CTR encryption started");

        let keystream = Self::keystream(client, &counters, endpoint)?;
        let ciphertext = keystream
            .iter()
            .zip(&blocks)
            .map(|(key, block)| utils::xor_blocks(key, block))
            .collect::<Result<Vec<_>>>()?;

        Ok((ciphertext, hex::encode(counter)))
    }

    /// CTR mode decryption
    ///
    /// Since CTR is a stream cipher mode, decryption is identical to
    /// encryption under the counter returned by [`OracleModes::ctr_encrypt`].
    pub fn ctr_decrypt<O: BlockOracle>(
        client: &OracleClient<O>,
        ciphertext: &str,
        endpoint: &Endpoint,
        counter: &str,
    ) -> Result<Vec<String>> {
        if counter.is_empty() {
            return Err(ModeError::InvalidCustomValue { len: 0 });
        }
        Self::ctr_encrypt(client, ciphertext, endpoint, counter).map(|(plaintext, _)| plaintext)
    }

    /// Counter blocks for `count` blocks starting at `start`, as hex.
    fn counter_blocks(start: &[u8; BLOCK_BYTES], count: usize) -> Vec<String> {
        let (high, low) = start.split_at(BLOCK_BYTES / 2);
        let mut low_bytes = [0u8; 8];
        low_bytes.copy_from_slice(low);
        let low = u64::from_be_bytes(low_bytes);

        (0..count as u64)
            .map(|i| {
                let mut block = [0u8; BLOCK_BYTES];
                block[..8].copy_from_slice(high);
                block[8..].copy_from_slice(&low.wrapping_add(i).to_be_bytes());
                hex::encode(block)
            })
            .collect()
    }

    fn keystream_block<O: BlockOracle>(
        client: &OracleClient<O>,
        counter: &str,
        endpoint: &Endpoint,
        index: usize,
    ) -> Result<String> {
        let port = client.config().ports.port(endpoint.port, index)?;
        client.encrypt_block(counter, &endpoint.at_port(port))
    }

    #[cfg(feature = "parallel")]
    fn keystream<O: BlockOracle>(
        client: &OracleClient<O>,
        counters: &[String],
        endpoint: &Endpoint,
    ) -> Result<Vec<String>> {
        use rayon::prelude::*;

        if !client.config().parallel_ctr {
            return Self::sequential_keystream(client, counters, endpoint);
        }
        // indexed collect keeps plaintext order; the server side stays
        // sequential, see `OracleConfig::parallel_ctr`
        counters
            .par_iter()
            .enumerate()
            .map(|(i, counter)| Self::keystream_block(client, counter, endpoint, i))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn keystream<O: BlockOracle>(
        client: &OracleClient<O>,
        counters: &[String],
        endpoint: &Endpoint,
    ) -> Result<Vec<String>> {
        if client.config().parallel_ctr {
            tracing::warn!("built without the `parallel` feature, CTR rounds run sequentially");
        }
        Self::sequential_keystream(client, counters, endpoint)
    }

    fn sequential_keystream<O: BlockOracle>(
        client: &OracleClient<O>,
        counters: &[String],
        endpoint: &Endpoint,
    ) -> Result<Vec<String>> {
        counters
            .iter()
            .enumerate()
            .map(|(i, counter)| Self::keystream_block(client, counter, endpoint, i))
            .collect()
    }
}
