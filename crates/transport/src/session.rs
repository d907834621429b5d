//! SFTP session establishment
//!
//! Dials the remote host over SSH with password authentication, verifies the
//! server key according to the configured strategy, and negotiates the `sftp`
//! subsystem. One `SftpConnection` owns one SSH connection; it is closed
//! explicitly when the transfer that created it finishes.

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use russh::client;
use russh_sftp::client::SftpSession;
use tracing::{debug, info, warn};

use sftpsync_core::{ConnectConfig, HostVerification, CONNECT_TIMEOUT};

/// russh client handler; its only job is server key verification
struct ClientHandler {
    host: String,
    port: u16,
    verification: HostVerification,
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh_keys::key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match &self.verification {
            HostVerification::AcceptAny => {
                warn!("accepting server key without verification (insecure)");
                Ok(true)
            }
            HostVerification::Pinned(expected) => {
                let fingerprint = server_public_key.fingerprint();
                let fingerprint = fingerprint.strip_prefix("SHA256:").unwrap_or(&fingerprint);
                if fingerprint == expected {
                    debug!("server key matches pinned fingerprint");
                    Ok(true)
                } else {
                    warn!(
                        "server key fingerprint {fingerprint} does not match \
                         pinned fingerprint {expected}"
                    );
                    Ok(false)
                }
            }
            HostVerification::KnownHosts(path) => {
                let checked = match path {
                    Some(path) => russh_keys::check_known_hosts_path(
                        &self.host,
                        self.port,
                        server_public_key,
                        path,
                    ),
                    None => {
                        russh_keys::check_known_hosts(&self.host, self.port, server_public_key)
                    }
                };
                match checked {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        warn!(
                            "server key for {}:{} not found in known_hosts",
                            self.host, self.port
                        );
                        Ok(false)
                    }
                    Err(e) => {
                        warn!(
                            "known_hosts check failed for {}:{}: {e}",
                            self.host, self.port
                        );
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// An authenticated SFTP session bound to one SSH connection
pub struct SftpConnection {
    session: client::Handle<ClientHandler>,
    sftp: SftpSession,
}

impl SftpConnection {
    /// The negotiated SFTP subsystem handle
    #[must_use]
    pub fn sftp(&self) -> &SftpSession {
        &self.sftp
    }

    /// Close the SFTP channel and disconnect the SSH session
    pub async fn close(mut self) -> Result<()> {
        self.sftp
            .close()
            .await
            .map_err(|e| eyre!("failed to close sftp channel: {e}"))?;
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "english")
            .await?;
        Ok(())
    }
}

/// Connect to the remote host and negotiate the SFTP subsystem.
///
/// The dial is bounded by [`CONNECT_TIMEOUT`]; authentication is password
/// only. Failures are logged and returned, never retried.
///
/// # Errors
/// Returns an error on dial timeout, connection failure, rejected
/// credentials, or SFTP subsystem negotiation failure.
pub async fn connect(config: &ConnectConfig) -> Result<SftpConnection> {
    let (host, port) = config.host_port()?;
    info!("connecting to {}@{}", config.username, config.address);

    let ssh_config = Arc::new(client::Config::default());
    let handler = ClientHandler {
        host: host.to_string(),
        port,
        verification: config.verification.clone(),
    };

    let mut session = tokio::time::timeout(
        CONNECT_TIMEOUT,
        client::connect(ssh_config, (host, port), handler),
    )
    .await
    .map_err(|_| {
        let e = eyre!(
            "connection to {} timed out after {:?}",
            config.address,
            CONNECT_TIMEOUT
        );
        warn!("{e}");
        e
    })?
    .map_err(|e| {
        warn!("connection to {} failed: {e}", config.address);
        eyre!("connection to {} failed: {e}", config.address)
    })?;

    let authenticated = session
        .authenticate_password(&config.username, &config.password)
        .await?;
    if !authenticated {
        let e = eyre!("server rejected password for user {:?}", config.username);
        warn!("{e}");
        return Err(e);
    }
    debug!("authenticated as {}", config.username);

    let channel = session.channel_open_session().await?;
    channel.request_subsystem(true, "sftp").await?;
    let sftp = SftpSession::new(channel.into_stream())
        .await
        .map_err(|e| {
            warn!("sftp subsystem negotiation failed: {e}");
            eyre!("sftp subsystem negotiation failed: {e}")
        })?;
    debug!("sftp subsystem ready");

    Ok(SftpConnection { session, sftp })
}
