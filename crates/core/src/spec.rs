//! File spec resolution
//!
//! The file spec is the `local_path:remote_path` string given on the command
//! line. It must split into exactly two non-empty segments; anything else
//! aborts the run before any connection is attempted. Paths that themselves
//! contain `:` (Windows drive letters, remote paths with colons) are an
//! unsupported, documented limitation of the format.

use std::path::PathBuf;

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// A resolved local/remote path pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// Path on the local filesystem
    pub local: PathBuf,
    /// Path on the remote host, kept verbatim as the server sees it
    pub remote: String,
}

impl FileSpec {
    /// Parse a `local_path:remote_path` spec.
    ///
    /// # Errors
    /// Returns an error if the spec does not contain exactly one `:` or if
    /// either side is empty.
    pub fn parse(spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        let [local, remote] = parts.as_slice() else {
            return Err(eyre!(
                "invalid file spec {spec:?}, expected local_path:remote_path"
            ));
        };
        if local.is_empty() || remote.is_empty() {
            return Err(eyre!(
                "invalid file spec {spec:?}, both sides of `:` must be non-empty"
            ));
        }
        Ok(Self {
            local: PathBuf::from(*local),
            remote: (*remote).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_parse_returns_sides_unchanged() {
        let spec = FileSpec::parse("from/local.txt:to/remote.txt").unwrap();
        assert_eq!(spec.local, Path::new("from/local.txt"));
        assert_eq!(spec.remote, "to/remote.txt");
    }

    #[test]
    fn test_parse_absolute_paths() {
        let spec = FileSpec::parse("/var/log/app.log:/srv/backup/app.log").unwrap();
        assert_eq!(spec.local, Path::new("/var/log/app.log"));
        assert_eq!(spec.remote, "/srv/backup/app.log");
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(FileSpec::parse("just-one-path").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_separators() {
        // Drive letters and colon-bearing remote paths misparse by design
        assert!(FileSpec::parse("C:\\file.txt:remote.txt").is_err());
        assert!(FileSpec::parse("a:b:c").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_sides() {
        assert!(FileSpec::parse(":remote.txt").is_err());
        assert!(FileSpec::parse("local.txt:").is_err());
        assert!(FileSpec::parse(":").is_err());
        assert!(FileSpec::parse("").is_err());
    }
}
