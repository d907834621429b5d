//! sftpsync-core: Configuration and path resolution
//!
//! Pure value types shared by the transport and cli crates. No I/O, no
//! network, so everything here is unit-testable.

pub mod config;
pub mod spec;

pub use config::{
    ConnectConfig, Direction, HostVerification, WatchAction, CONNECT_TIMEOUT, REMOTE_FILE_MODE,
};
pub use spec::FileSpec;
