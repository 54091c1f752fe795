use std::{
    future::Future,
    io::Write,
    path::PathBuf,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy_primitives::{Address, Bytes, B256};
use safe_multisig::TxRef;
use tracing_subscriber::EnvFilter;

/// Name of the directory under `$HOME` holding the key registry.
pub const DATA_DIR_NAME: &str = ".safe-signer";

/// File name of the key registry inside the data directory.
pub const KEYS_FILE: &str = "keys.json";

/// Installs the log subscriber. `RUST_LOG` takes precedence over `--debug`.
pub fn init_tracing(debug: bool) -> eyre::Result<()> {
    let default_directive = if debug { "debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init()
        .map_err(|err| eyre::eyre!(err))
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Parses an address for clap, accepting any single-case or correctly checksummed spelling.
pub fn parse_address_arg(value: &str) -> Result<Address, String> {
    safe_primitives::parse_address(value).map_err(|err| err.to_string())
}

/// Parses 0x-prefixed or bare hex calldata. `0x` is empty calldata.
pub fn parse_bytes_arg(value: &str) -> Result<Bytes, String> {
    Bytes::from_str(value.trim()).map_err(|err| format!("invalid hex data: {err}"))
}

/// A transaction is referenced either by its safe transaction hash or by its gateway id.
pub fn parse_tx_ref(value: &str) -> Result<TxRef, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("transaction reference is empty".to_string());
    }

    if value.starts_with("0x") && value.len() == 66 {
        return B256::from_str(value)
            .map(TxRef::SafeTxHash)
            .map_err(|err| format!("invalid safe transaction hash: {err}"));
    }

    Ok(TxRef::Id(value.to_string()))
}

/// Print a spinner while awaiting `future`.
pub async fn print_loading_until_async<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    let message = message.to_string();

    std::thread::spawn(move || {
        let spinner = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut stdout = std::io::stdout();
        let mut i = 0;

        while running_clone.load(Ordering::Relaxed) {
            print!("\r{} {} ", message, spinner[i]);
            let _ = stdout.flush();
            std::thread::sleep(Duration::from_millis(100));
            i = (i + 1) % spinner.len();
        }

        print!("\r{}\r", " ".repeat(message.chars().count() + 2));
        let _ = stdout.flush();
    });

    let result = future.await;

    running.store(false, Ordering::Relaxed);
    // Let the spinner clear its line.
    tokio::time::sleep(Duration::from_millis(100)).await;

    result
}
