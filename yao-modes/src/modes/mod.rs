//! Modes of operation over the oracle

pub mod cbc;
pub mod ctr;

/// Main struct for the oracle-backed modes
pub struct OracleModes;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use crate::error::Result;
    use crate::oracle::{BlockOracle, Endpoint};

    pub const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

    /// Wraps an oracle and records the port of every round.
    pub struct Recording<O> {
        pub inner: O,
        pub ports: Mutex<Vec<u16>>,
    }

    impl<O> Recording<O> {
        pub fn new(inner: O) -> Self {
            Self {
                inner,
                ports: Mutex::new(Vec::new()),
            }
        }

        pub fn ports(&self) -> Vec<u16> {
            let mut ports = self.ports.lock().unwrap().clone();
            ports.sort_unstable();
            ports
        }
    }

    impl<O: BlockOracle> BlockOracle for Recording<O> {
        fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String> {
            self.ports.lock().unwrap().push(endpoint.port);
            self.inner.invoke(native_block, endpoint)
        }
    }
}
