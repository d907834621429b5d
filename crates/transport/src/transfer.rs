//! Single-file transfer engine
//!
//! Exactly one endpoint of every transfer is remote and exactly one is
//! local; the direction decides which. The source is opened read-only before
//! the destination is opened for write/create/truncate, so a missing source
//! never truncates a pre-existing destination.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use russh_sftp::protocol::{FileAttributes, OpenFlags};
use tokio::fs::File;
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use sftpsync_core::{ConnectConfig, Direction, FileSpec, REMOTE_FILE_MODE};

use crate::session::{connect, SftpConnection};

const COPY_BUFFER: usize = 64 * 1024;

/// Transfer one file between the local filesystem and the remote host.
///
/// Establishes its own session and closes it on every exit path. Returns the
/// number of bytes copied. There is no retry, no partial-file rollback and
/// no resume; any failure aborts the transfer.
///
/// # Errors
/// Returns an error if the connection, either open, or the copy fails.
pub async fn sync_file(
    config: &ConnectConfig,
    spec: &FileSpec,
    direction: Direction,
) -> Result<u64> {
    let conn = connect(config).await?;
    let result = match direction {
        Direction::Push => push(&conn, spec).await,
        Direction::Pull => pull(&conn, spec).await,
    };
    if let Err(e) = conn.close().await {
        debug!("error closing session: {e}");
    }
    let bytes = result?;
    info!("transferred {bytes} bytes ({direction})");
    Ok(bytes)
}

/// Copy the local file to the remote path
async fn push(conn: &SftpConnection, spec: &FileSpec) -> Result<u64> {
    let source = File::open(&spec.local)
        .await
        .wrap_err_with(|| format!("failed to open local file {}", spec.local.display()))?;

    let dest = conn
        .sftp()
        .open_with_flags(
            spec.remote.as_str(),
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
        )
        .await
        .wrap_err_with(|| format!("failed to open remote file {:?}", spec.remote))?;

    let attrs = FileAttributes {
        permissions: Some(REMOTE_FILE_MODE),
        ..FileAttributes::default()
    };
    conn.sftp()
        .set_metadata(spec.remote.as_str(), attrs)
        .await
        .wrap_err_with(|| format!("failed to set mode on remote file {:?}", spec.remote))?;

    copy_stream(source, dest).await
}

/// Copy the remote file to the local path
async fn pull(conn: &SftpConnection, spec: &FileSpec) -> Result<u64> {
    let source = conn
        .sftp()
        .open_with_flags(spec.remote.as_str(), OpenFlags::READ)
        .await
        .wrap_err_with(|| format!("failed to open remote file {:?}", spec.remote))?;

    // Local destinations keep the open-time mode; only remote
    // destinations get an explicit chmod.
    let dest = File::create(&spec.local)
        .await
        .wrap_err_with(|| format!("failed to create local file {}", spec.local.display()))?;

    copy_stream(source, dest).await
}

/// Buffered streaming copy to end-of-stream; returns bytes copied
async fn copy_stream<R, W>(source: R, mut dest: W) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::with_capacity(COPY_BUFFER, source);
    let bytes = io::copy_buf(&mut reader, &mut dest).await?;
    dest.shutdown().await?;
    Ok(bytes)
}
