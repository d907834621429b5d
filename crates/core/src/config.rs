//! Run configuration value types
//!
//! All configuration is resolved once at startup into immutable values and
//! passed by parameter; there is no ambient global state.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::eyre;

/// Fixed dial timeout for the SSH connection. Only the initial dial is
/// time-bounded; the byte copy itself is not.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Permission bits applied to a freshly written remote file.
pub const REMOTE_FILE_MODE: u32 = 0o644;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Local file is the source, remote object the destination
    #[default]
    Push,
    /// Remote object is the source, local file the destination
    Pull,
}

impl Direction {
    /// Map the legacy reverse flag onto a direction
    #[must_use]
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Pull } else { Self::Push }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
        }
    }
}

/// Host key verification strategy.
///
/// `AcceptAny` reproduces the legacy behavior of accepting every server key
/// without inspection. It offers no man-in-the-middle protection and is only
/// appropriate on networks you already trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostVerification {
    /// Accept any server key (insecure)
    AcceptAny,
    /// Accept only a key whose SHA256 fingerprint matches
    Pinned(String),
    /// Check the key against an OpenSSH known_hosts file;
    /// `None` means `~/.ssh/known_hosts`
    KnownHosts(Option<PathBuf>),
}

impl Default for HostVerification {
    fn default() -> Self {
        Self::KnownHosts(None)
    }
}

impl FromStr for HostVerification {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept-any" => Ok(Self::AcceptAny),
            "known-hosts" => Ok(Self::KnownHosts(None)),
            _ => {
                if let Some(fp) = s.strip_prefix("pinned:") {
                    // Stored without the hash-name prefix so comparison is uniform
                    let fp = fp.strip_prefix("SHA256:").unwrap_or(fp);
                    if fp.is_empty() {
                        return Err(eyre!("pinned host key requires a fingerprint"));
                    }
                    Ok(Self::Pinned(fp.to_string()))
                } else if let Some(path) = s.strip_prefix("known-hosts:") {
                    if path.is_empty() {
                        return Err(eyre!("known-hosts path must not be empty"));
                    }
                    Ok(Self::KnownHosts(Some(PathBuf::from(path))))
                } else {
                    Err(eyre!(
                        "invalid host key strategy {s:?}, expected \
                         accept-any, pinned:<fingerprint> or known-hosts[:path]"
                    ))
                }
            }
        }
    }
}

/// What the watch loop does when the local file changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchAction {
    /// Log the event and do nothing else (legacy behavior)
    #[default]
    LogOnly,
    /// Log the event and push the file to the remote end
    LogAndResync,
}

impl FromStr for WatchAction {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Self::LogOnly),
            "resync" => Ok(Self::LogAndResync),
            _ => Err(eyre!("invalid watch action {s:?}, expected log or resync")),
        }
    }
}

/// Everything needed to establish one authenticated SFTP session
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Remote address as `host:port`
    pub address: String,
    /// Login username
    pub username: String,
    /// Login password (password auth is the only supported method)
    pub password: String,
    /// Server key verification strategy
    pub verification: HostVerification,
}

impl ConnectConfig {
    /// Split the address into host and port.
    ///
    /// # Errors
    /// Returns an error if the address is not of the form `host:port`.
    pub fn host_port(&self) -> color_eyre::Result<(&str, u16)> {
        let (host, port) = self
            .address
            .rsplit_once(':')
            .ok_or_else(|| eyre!("invalid address {:?}, expected host:port", self.address))?;
        let port: u16 = port
            .parse()
            .map_err(|_| eyre!("invalid port in address {:?}", self.address))?;
        Ok((host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_default_is_push() {
        assert_eq!(Direction::default(), Direction::Push);
        assert_eq!(Direction::from_reverse(false), Direction::Push);
        assert_eq!(Direction::from_reverse(true), Direction::Pull);
    }

    #[test]
    fn test_host_verification_parse() {
        assert_eq!(
            "accept-any".parse::<HostVerification>().unwrap(),
            HostVerification::AcceptAny
        );
        assert_eq!(
            "known-hosts".parse::<HostVerification>().unwrap(),
            HostVerification::KnownHosts(None)
        );
        assert_eq!(
            "known-hosts:/etc/ssh/known_hosts"
                .parse::<HostVerification>()
                .unwrap(),
            HostVerification::KnownHosts(Some(PathBuf::from("/etc/ssh/known_hosts")))
        );
    }

    #[test]
    fn test_host_verification_pinned_strips_prefix() {
        let fp = "nThbg6kXUpJWGl7E1IGOCspRomTxdCARLviKw6E5SY8";
        let parsed = format!("pinned:SHA256:{fp}").parse::<HostVerification>().unwrap();
        assert_eq!(parsed, HostVerification::Pinned(fp.to_string()));

        let parsed = format!("pinned:{fp}").parse::<HostVerification>().unwrap();
        assert_eq!(parsed, HostVerification::Pinned(fp.to_string()));
    }

    #[test]
    fn test_host_verification_rejects_garbage() {
        assert!("".parse::<HostVerification>().is_err());
        assert!("pinned:".parse::<HostVerification>().is_err());
        assert!("pinned:SHA256:".parse::<HostVerification>().is_err());
        assert!("known-hosts:".parse::<HostVerification>().is_err());
        assert!("tofu".parse::<HostVerification>().is_err());
    }

    #[test]
    fn test_watch_action_parse() {
        assert_eq!("log".parse::<WatchAction>().unwrap(), WatchAction::LogOnly);
        assert_eq!(
            "resync".parse::<WatchAction>().unwrap(),
            WatchAction::LogAndResync
        );
        assert!("sync".parse::<WatchAction>().is_err());
    }

    #[test]
    fn test_host_port_split() {
        let config = ConnectConfig {
            address: "example.com:2222".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            verification: HostVerification::default(),
        };
        assert_eq!(config.host_port().unwrap(), ("example.com", 2222));
    }

    #[test]
    fn test_host_port_rejects_missing_port() {
        let config = ConnectConfig {
            address: "example.com".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            verification: HostVerification::default(),
        };
        assert!(config.host_port().is_err());
    }
}
