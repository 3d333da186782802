//! Oracle configuration
//!
//! Built once by the caller and passed by reference into the client, the
//! server and the mode engines. Nothing in the crate keeps configuration in
//! global state.

use std::path::{Path, PathBuf};

use crate::port::PortAllocator;

/// Location of the TinyGarble binary relative to its root directory.
pub const TINYGARBLE_BIN: &str = "bin/garbled_circuit/TinyGarble";

/// Default netlist directory relative to the TinyGarble root.
pub const NETLIST_DIR: &str = "scd/netlists";

/// Default single clock cycle AES-128 netlist.
pub const AES_1CC_CIRCUIT: &str = "aes_1cc.scd";

/// Immutable configuration of the oracle and of the engines using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// TinyGarble executable.
    pub program: PathBuf,
    /// Netlist of the evaluated circuit, fixed to one AES-128 block encryption.
    pub circuit: PathBuf,
    /// Clock cycles the circuit needs; a property of the netlist.
    pub clock_cycles: u32,
    /// Supply data as `--input` even for multi-cycle circuits.
    pub force_input: bool,
    /// Port strategy shared by client and server.
    pub ports: PortAllocator,
    /// Issue CTR keystream rounds concurrently.
    ///
    /// `OracleServer` still serves one round at a time, so the client rounds
    /// for later ports wait in TinyGarble's connect retry until the server
    /// reaches them. This only pays off against several servers, or when
    /// client-side setup dominates a round.
    pub parallel_ctr: bool,
}

impl OracleConfig {
    /// Configuration for the default AES netlist of a TinyGarble checkout.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(
            root.join(TINYGARBLE_BIN),
            root.join(NETLIST_DIR).join(AES_1CC_CIRCUIT),
        )
    }

    pub fn new(program: impl Into<PathBuf>, circuit: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            circuit: circuit.into(),
            clock_cycles: 1,
            force_input: false,
            ports: PortAllocator::Monotonic,
            parallel_ctr: false,
        }
    }

    pub fn with_clock_cycles(mut self, clock_cycles: u32) -> Self {
        self.clock_cycles = clock_cycles;
        self
    }

    pub fn with_force_input(mut self, force_input: bool) -> Self {
        self.force_input = force_input;
        self
    }

    pub fn with_ports(mut self, ports: PortAllocator) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_parallel_ctr(mut self, parallel_ctr: bool) -> Self {
        self.parallel_ctr = parallel_ctr;
        self
    }

    /// Single-cycle circuits always take their data as `--input`.
    pub fn uses_single_input(&self) -> bool {
        self.clock_cycles <= 1 || self.force_input
    }

    /// Arguments selecting the input convention, followed by the data itself.
    pub fn input_args(&self, data: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if self.clock_cycles > 1 {
            args.push("--clock_cycle".to_string());
            args.push(self.clock_cycles.to_string());
        }
        let flag = if self.uses_single_input() {
            "--input"
        } else {
            "--init"
        };
        args.push(flag.to_string());
        args.push(data.to_string());
        args
    }
}
