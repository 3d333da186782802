//! The block-cipher oracle seen from the mode engines
//!
//! An oracle evaluates one AES-128 block per invocation. It speaks its own
//! little-endian hex; [`OracleClient`] owns the conversion to and from the
//! engines' big-endian blocks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::{ModeError, Result};
use crate::tinygarble::TinyGarbleClient;
use crate::utils::{reverse_endianness, BLOCK_BYTES, BLOCK_HEX_LEN};

/// Address and port of the server role for one round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub addr: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }

    /// Same address, another port.
    pub fn at_port(&self, port: u16) -> Self {
        Self {
            addr: self.addr.clone(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

/// One round trip to the oracle.
///
/// Input and output are hex blocks in the oracle's native byte order. An
/// implementation runs at most one round per call and never retries.
pub trait BlockOracle: Sync {
    fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String>;
}

impl<T: BlockOracle + ?Sized> BlockOracle for &T {
    fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String> {
        (**self).invoke(native_block, endpoint)
    }
}

impl<T: BlockOracle + ?Sized> BlockOracle for Box<T> {
    fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String> {
        (**self).invoke(native_block, endpoint)
    }
}

/// Client side of the oracle as used by the mode engines.
pub struct OracleClient<O> {
    oracle: O,
    config: OracleConfig,
}

impl OracleClient<TinyGarbleClient> {
    /// Client that runs the TinyGarble binary once per block.
    pub fn tinygarble(config: OracleConfig) -> Self {
        Self::new(TinyGarbleClient::new(config.clone()), config)
    }
}

impl<O: BlockOracle> OracleClient<O> {
    pub fn new(oracle: O, config: OracleConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Encrypts one full big-endian block on `endpoint`.
    ///
    /// The block is reversed to the oracle's order before sending and the
    /// result reversed back after receiving. The returned block is uppercase.
    pub fn encrypt_block(&self, block: &str, endpoint: &Endpoint) -> Result<String> {
        if block.len() != BLOCK_HEX_LEN {
            return Err(ModeError::MalformedHexInput(format!(
                "oracle blocks are {BLOCK_HEX_LEN} hex characters, got {}",
                block.len()
            )));
        }

        let native = reverse_endianness(block)?;
        debug!(%endpoint, block = %native, "sending block to oracle");

        let output = self.oracle.invoke(&native, endpoint)?;
        let output = output.trim();
        if output.len() != BLOCK_HEX_LEN || !output.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(ModeError::OracleInvocationFailed(format!(
                "unexpected oracle output {output:?} from {endpoint}"
            )));
        }

        let ciphertext = reverse_endianness(output)?.to_ascii_uppercase();
        debug!(%endpoint, block = %ciphertext, "received block from oracle");
        Ok(ciphertext)
    }
}

/// Oracle answering from a table of precomputed vectors.
///
/// Vectors are registered in big-endian order and stored in the oracle's
/// native order. Every endpoint it is called on is recorded.
#[derive(Debug, Default)]
pub struct VectorOracle {
    vectors: HashMap<String, String>,
    calls: Mutex<Vec<Endpoint>>,
}

impl VectorOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, plaintext: &str, ciphertext: &str) -> Result<Self> {
        self.vectors.insert(
            reverse_endianness(plaintext)?.to_ascii_uppercase(),
            reverse_endianness(ciphertext)?.to_ascii_uppercase(),
        );
        Ok(self)
    }

    /// Endpoints of all invocations so far, in call order.
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl BlockOracle for VectorOracle {
    fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.clone());
        }
        self.vectors
            .get(&native_block.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| {
                ModeError::OracleInvocationFailed(format!(
                    "no vector for block {native_block} on {endpoint}"
                ))
            })
    }
}

/// In-process AES-128 with the oracle's byte order.
///
/// Stands in for the two-party computation when the key is known locally:
/// dry runs, tests and benchmarks. The endpoint is ignored.
#[derive(Clone)]
pub struct LocalOracle {
    cipher: Aes128,
}

impl LocalOracle {
    /// `key` is 32 hex characters in big-endian order.
    pub fn new(key: &str) -> Result<Self> {
        let mut bytes = [0u8; BLOCK_BYTES];
        hex::decode_to_slice(key, &mut bytes)?;
        let key = GenericArray::from(bytes);
        Ok(Self {
            cipher: Aes128::new(&key),
        })
    }
}

impl fmt::Debug for LocalOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalOracle").finish_non_exhaustive()
    }
}

impl BlockOracle for LocalOracle {
    fn invoke(&self, native_block: &str, _endpoint: &Endpoint) -> Result<String> {
        let mut bytes = [0u8; BLOCK_BYTES];
        hex::decode_to_slice(reverse_endianness(native_block)?, &mut bytes)?;

        let mut block = GenericArray::from(bytes);
        self.cipher.encrypt_block(&mut block);

        reverse_endianness(&hex::encode(block))
    }
}
