//! sftpsync: one-shot or watch-triggered single-file SFTP synchronizer
//!
//! Copies a single named file between the local filesystem and a remote host
//! over SFTP, in either direction. With `-m` it watches the local file for
//! changes instead of exiting after one transfer.
//!
//! Security note: `--host-key accept-any` disables server key verification
//! and leaves the connection open to interception. The default checks the
//! server key against `~/.ssh/known_hosts`.

mod watch;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::warn;

use sftpsync_core::{ConnectConfig, Direction, FileSpec, HostVerification, WatchAction};

#[derive(Parser, Debug)]
#[command(name = "sftpsync")]
#[command(about = "Sync a single file to or from a remote host over SFTP")]
struct Cli {
    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Verbose logging with file and line information
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Monitor mode: watch the local file and log each change.
    /// Only supports pushing the local file to the remote end.
    #[arg(short = 'm', long = "monitor")]
    monitor: bool,

    /// Remote address as host:port
    #[arg(short = 'a', long = "address", required_unless_present = "version")]
    address: Option<String>,

    /// User for login
    #[arg(short = 'u', long = "user", required_unless_present = "version")]
    user: Option<String>,

    /// Password to use when connecting to the server
    #[arg(short = 'p', long = "password", required_unless_present = "version")]
    password: Option<String>,

    /// File spec in the form local_path:remote_path
    #[arg(short = 'f', long = "file", required_unless_present = "version")]
    file: Option<String>,

    /// Reverse the transfer direction: pull the remote file to local
    /// instead of pushing the local file to the remote end
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Host key verification: accept-any (insecure),
    /// pinned:<SHA256 fingerprint>, or known-hosts[:path]
    #[arg(short = 'k', long = "host-key", default_value = "known-hosts")]
    host_key: HostVerification,

    /// What to do when the watched file changes: log, or resync
    #[arg(long = "on-change", default_value = "log")]
    on_change: WatchAction,
}

impl Cli {
    /// Assemble the run configuration from the parsed flags.
    ///
    /// clap already enforces presence of the required flags; the `ok_or_else`
    /// arms only guard against that invariant breaking.
    fn into_run(self) -> Result<(ConnectConfig, FileSpec)> {
        let config = ConnectConfig {
            address: self.address.ok_or_else(|| eyre!("missing address (-a)"))?,
            username: self.user.ok_or_else(|| eyre!("missing user (-u)"))?,
            password: self.password.ok_or_else(|| eyre!("missing password (-p)"))?,
            verification: self.host_key,
        };
        let file = self.file.ok_or_else(|| eyre!("missing file spec (-f)"))?;
        let spec = FileSpec::parse(&file)?;
        Ok((config, spec))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if cli.version {
        eprintln!("sftpsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(cli.debug);

    let monitor = cli.monitor;
    let action = cli.on_change;
    let direction = Direction::from_reverse(cli.reverse);
    let (config, spec) = cli.into_run()?;

    if monitor {
        if direction == Direction::Pull {
            warn!("monitor mode only supports pushing the local file to the remote end");
            return Ok(());
        }
        watch::watch(&config, &spec, action).await
    } else {
        // sync_file logs the byte total; this is the terminal operation
        sftpsync_transport::sync_file(&config, &spec, direction).await?;
        Ok(())
    }
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "info" };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if debug {
        builder.with_file(true).with_line_number(true).init();
    } else {
        builder.init();
    }
}
