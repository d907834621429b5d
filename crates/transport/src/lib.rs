//! sftpsync-transport: SFTP session and transfer engine
//!
//! Establishes one authenticated SFTP session per transfer and streams a
//! single file between the local filesystem and the remote host.

pub mod session;
pub mod transfer;

pub use session::{connect, SftpConnection};
pub use transfer::sync_file;
