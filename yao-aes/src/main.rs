//! AES-128 over TinyGarble
//!
//! Runs either the key-holding server role for a number of oracle rounds, or
//! the data-holding client role encrypting a single block, or a payload in
//! CTR or CBC-CTS mode.
//! Start the server first; the client's starting port must match.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use yao_modes::config::{NETLIST_DIR, TINYGARBLE_BIN};
use yao_modes::{
    BlockOracle, Endpoint, LocalOracle, OracleClient, OracleConfig, OracleModes, OracleServer,
    PortAllocator,
};

/// Command-line arguments for the garbled AES program.
#[derive(Parser, Debug)]
#[command(name = "yao-aes")]
#[command(about = "AES-128 CTR and CBC-CTS through TinyGarble garbled circuits")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    oracle: OracleArgs,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides it
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    role: Role,
}

#[derive(Args, Debug)]
struct OracleArgs {
    /// TinyGarble root directory
    #[arg(short = 'r', long, env = "TINYGARBLE", global = true)]
    tinygarble_root: Option<PathBuf>,

    /// Circuit directory, defaults to <root>/scd/netlists
    #[arg(short = 'c', long, global = true)]
    circuit_dir: Option<PathBuf>,

    /// Circuit file name inside the circuit directory
    #[arg(short = 'n', long, default_value = "aes_1cc.scd", global = true)]
    circuit: String,

    /// Clock cycles needed by the circuit (aes_1cc.scd needs 1)
    #[arg(long, default_value_t = 1, global = true)]
    clock_cycles: u32,

    /// Pass data with --input even for multi-cycle circuits
    #[arg(long, global = true)]
    force_input: bool,

    /// Reuse a pool of this many ports instead of counting up forever
    #[arg(long, global = true)]
    port_pool: Option<u16>,

    /// Run CTR rounds concurrently. The server role still serves rounds one
    /// at a time; early clients wait in TinyGarble's connect retry
    #[arg(long, global = true)]
    parallel: bool,

    /// Encrypt in-process with this key instead of running TinyGarble
    #[arg(long, global = true)]
    local_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Serve oracle rounds with the key (server role)
    Server {
        /// AES-128 key, 32 hex characters
        #[arg(short, long)]
        key: String,

        /// Port of the first round
        #[arg(short, long, default_value_t = 1234)]
        port: u16,

        /// Rounds to serve, negative for no limit
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        rounds: i64,
    },
    #[command(flatten)]
    Client(ClientRole),
}

#[derive(Subcommand, Debug)]
enum ClientRole {
    /// Encrypt one 16-byte block in a single oracle round (client role)
    Block(BlockArgs),
    /// Encrypt in counter mode (client role)
    Ctr(ClientArgs),
    /// Encrypt in CBC mode with ciphertext stealing (client role)
    Cbc(ClientArgs),
}

#[derive(Args, Debug)]
struct BlockArgs {
    /// Block as hex, 32 characters
    #[arg(short, long)]
    data: String,

    /// Address of the server role
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    addr: String,

    /// Port of the round
    #[arg(short, long, default_value_t = 1234)]
    port: u16,
}

#[derive(Args, Debug)]
struct ClientArgs {
    /// Plaintext as hex
    #[arg(short, long)]
    data: String,

    /// Address of the server role
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    addr: String,

    /// Port of the first round
    #[arg(short, long, default_value_t = 1234)]
    port: u16,

    /// IV / initial counter, 32 hex characters; random when omitted
    #[arg(long, default_value = "")]
    iv: String,
}

impl OracleArgs {
    fn config(&self) -> Result<OracleConfig, Box<dyn Error>> {
        let root = match (&self.tinygarble_root, &self.local_key) {
            (Some(root), _) => root.clone(),
            (None, Some(_)) => PathBuf::new(),
            (None, None) => {
                return Err(
                    "TinyGarble root not set: pass --tinygarble-root or set $TINYGARBLE".into(),
                )
            }
        };
        let circuit_dir = self
            .circuit_dir
            .clone()
            .unwrap_or_else(|| root.join(NETLIST_DIR));
        let ports = match self.port_pool {
            Some(size) => PortAllocator::Pool { size },
            None => PortAllocator::Monotonic,
        };

        Ok(
            OracleConfig::new(root.join(TINYGARBLE_BIN), circuit_dir.join(&self.circuit))
                .with_clock_cycles(self.clock_cycles)
                .with_force_input(self.force_input)
                .with_ports(ports)
                .with_parallel_ctr(self.parallel),
        )
    }
}

impl ClientRole {
    /// Runs the client role and returns the lines to print.
    fn run<O: BlockOracle>(
        &self,
        client: &OracleClient<O>,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        let lines = match self {
            ClientRole::Block(args) => {
                let endpoint = Endpoint::new(args.addr.clone(), args.port);
                let block = client.encrypt_block(&args.data, &endpoint)?;
                vec![format!("Ciphertext block: {block}")]
            }
            ClientRole::Ctr(args) => {
                let endpoint = Endpoint::new(args.addr.clone(), args.port);
                let (ciphertext, counter) =
                    OracleModes::ctr_encrypt(client, &args.data, &endpoint, &args.iv)?;
                vec![
                    format!("Ciphertext in CTR: {}", ciphertext.concat()),
                    format!("Counter used: {counter}"),
                ]
            }
            ClientRole::Cbc(args) => {
                let endpoint = Endpoint::new(args.addr.clone(), args.port);
                let (ciphertext, iv) =
                    OracleModes::cbc_encrypt(client, &args.data, &endpoint, &args.iv)?;
                vec![
                    format!("Ciphertext in CBC-CTS: {}", ciphertext.concat()),
                    format!("IV used: {iv}"),
                ]
            }
        };
        Ok(lines)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("yao_aes={level},yao_modes={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.oracle.config()?;
    debug!(?config, "oracle configuration");

    match &cli.role {
        Role::Server { key, port, rounds } => {
            info!(port, rounds, "launching AES server");
            let served = OracleServer::tinygarble(&config).serve(key, *port, *rounds)?;
            println!("AES server terminated after {served} rounds");
        }
        Role::Client(role) => {
            let lines = match &cli.oracle.local_key {
                Some(key) => role.run(&OracleClient::new(LocalOracle::new(key)?, config))?,
                None => role.run(&OracleClient::tinygarble(config))?,
            };
            for line in lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}
