//! # Yao Modes Library
//!
//! This library runs block cipher modes of operation on top of an AES-128
//! block oracle evaluated as a two-party garbled circuit (TinyGarble). Every
//! block encryption is a full round trip between a server role holding the
//! key and a client role holding the data, on a port of its own.
//!
//! ## Supported Modes
//!
//! - **CTR** (Counter Mode) - keystream of encrypted counters, rounds are
//!   independent and may run concurrently
//! - **CBC-CTS** (Cipher Block Chaining with ciphertext stealing) - strictly
//!   sequential, no padding expansion
//!
//! ## Usage
//!
//! ```rust
//! use yao_modes::{Endpoint, LocalOracle, OracleClient, OracleConfig, OracleModes};
//!
//! // In-process oracle; use `OracleClient::tinygarble` against a real server
//! let oracle = LocalOracle::new("2b7e151628aed2a6abf7158809cf4f3c")?;
//! let client = OracleClient::new(oracle, OracleConfig::from_root("/opt/TinyGarble"));
//! let endpoint = Endpoint::new("127.0.0.1", 1234);
//!
//! let (ciphertext, counter) = OracleModes::ctr_encrypt(
//!     &client,
//!     "6bc1bee22e409f96e93d7e117393172a",
//!     &endpoint,
//!     "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
//! )?;
//! assert_eq!(ciphertext, vec!["874D6191B620E3261BEF6864990DB6CE"]);
//! assert_eq!(counter, "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
//! # Ok::<(), yao_modes::ModeError>(())
//! ```
//!
//! The server side of the same rounds is [`OracleServer::serve`].

// Public modules
pub mod config;
pub mod error;
pub mod modes;
pub mod nonce;
pub mod oracle;
pub mod port;
pub mod server;
pub mod tinygarble;
pub mod utils;

// Re-exports for easy access
pub use config::OracleConfig;
pub use error::{ModeError, Result};
pub use modes::OracleModes;
pub use oracle::{BlockOracle, Endpoint, LocalOracle, OracleClient, VectorOracle};
pub use port::PortAllocator;
pub use server::{OracleServer, ServerRole};
pub use tinygarble::{TinyGarbleClient, TinyGarbleServer};

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

    #[test]
    fn test_all_modes_integration() {
        let client = OracleClient::new(
            LocalOracle::new(KEY).unwrap(),
            OracleConfig::new("TinyGarble", "aes_1cc.scd"),
        );
        let endpoint = Endpoint::new("127.0.0.1", 1234);
        let plaintext = hex::encode(b"Integration test message for all modes!");

        let (ctr, counter) = OracleModes::ctr_encrypt(&client, &plaintext, &endpoint, "").unwrap();
        assert_eq!(ctr.concat().len(), plaintext.len());
        let back = OracleModes::ctr_decrypt(&client, &ctr.concat(), &endpoint, &counter).unwrap();
        assert_eq!(back.concat(), plaintext.to_uppercase());

        let (cbc, iv) = OracleModes::cbc_encrypt(&client, &plaintext, &endpoint, "").unwrap();
        assert_eq!(cbc.concat().len(), plaintext.len());
        assert_eq!(iv.len(), 32);
    }

    #[test]
    fn test_boxed_oracle() {
        let oracle: Box<dyn BlockOracle> = Box::new(LocalOracle::new(KEY).unwrap());
        let client = OracleClient::new(oracle, OracleConfig::new("TinyGarble", "aes_1cc.scd"));
        let endpoint = Endpoint::new("127.0.0.1", 1234);
        let ct = client
            .encrypt_block("3243f6a8885a308d313198a2e0370734", &endpoint)
            .unwrap();
        assert_eq!(ct, "3925841D02DC09FBDC118597196A0B32");
    }
}
