//! TinyGarble subprocess roles
//!
//! Each round runs the TinyGarble binary once: the server role (`-a`) holds
//! the key, the client role (`-b`) holds the block and receives the result on
//! stdout. Both take their data in TinyGarble's little-endian hex.

use std::process::{Command, Output};

use tracing::{debug, info};

use crate::config::OracleConfig;
use crate::error::{ModeError, Result};
use crate::oracle::{BlockOracle, Endpoint};
use crate::server::ServerRole;

/// Report only the last clock cycle, never intermediate states.
const OUTPUT_MODE_LAST_CLOCK: &str = "2";

/// Client role, one subprocess per block.
#[derive(Debug, Clone)]
pub struct TinyGarbleClient {
    config: OracleConfig,
}

impl TinyGarbleClient {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, native_block: &str, endpoint: &Endpoint) -> Vec<String> {
        let mut args = vec![
            "-b".to_string(),
            "-i".to_string(),
            self.config.circuit.display().to_string(),
            "-s".to_string(),
            endpoint.addr.clone(),
            "-p".to_string(),
            endpoint.port.to_string(),
            "--output_mode".to_string(),
            OUTPUT_MODE_LAST_CLOCK.to_string(),
        ];
        args.extend(self.config.input_args(native_block));
        args
    }
}

impl BlockOracle for TinyGarbleClient {
    fn invoke(&self, native_block: &str, endpoint: &Endpoint) -> Result<String> {
        info!(%endpoint, "running client round");
        let output = run(&self.config, &self.args(native_block, endpoint))?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ModeError::OracleInvocationFailed(format!("client on {endpoint} printed nothing"))
            })
    }
}

/// Server role, one subprocess per round.
#[derive(Debug, Clone)]
pub struct TinyGarbleServer {
    config: OracleConfig,
}

impl TinyGarbleServer {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, native_key: &str, port: u16) -> Vec<String> {
        let mut args = vec![
            "-a".to_string(),
            "-i".to_string(),
            self.config.circuit.display().to_string(),
            "-p".to_string(),
            port.to_string(),
        ];
        args.extend(self.config.input_args(native_key));
        args
    }
}

impl ServerRole for TinyGarbleServer {
    fn serve_round(&self, native_key: &str, port: u16) -> Result<()> {
        info!(port, "running server round");
        let output = run(&self.config, &self.args(native_key, port))?;
        debug!(
            port,
            output = %String::from_utf8_lossy(&output.stdout).trim(),
            "server round finished"
        );
        Ok(())
    }
}

fn run(config: &OracleConfig, args: &[String]) -> Result<Output> {
    debug!(program = %config.program.display(), ?args, "spawning TinyGarble");
    let output = Command::new(&config.program)
        .args(args)
        .output()
        .map_err(|e| {
            ModeError::OracleInvocationFailed(format!(
                "failed to run {}: {e}",
                config.program.display()
            ))
        })?;

    if !output.status.success() {
        return Err(ModeError::OracleInvocationFailed(format!(
            "{} exited with {}: {}",
            config.program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output)
}
