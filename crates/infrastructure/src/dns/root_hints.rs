use mailnet_domain::{Config, DnsError, DnsRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ROOTS_FILE: &str = "dnsroots";

/// Owner name given to root hint records.
pub const ROOT_OWNER: &str = ".";

/// Root name server list, one host name per line.
///
/// The file is read on every [`load`](Self::load); nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootHints {
    path: PathBuf,
}

impl RootHints {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.dns.roots_path(&config.server))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<DnsRecord>, DnsError> {
        self.load_with(&mut fastrand::Rng::new())
    }

    /// Reads the hints as NS records and rotates the list to start at an
    /// index drawn from `rng`.
    pub fn load_with(&self, rng: &mut fastrand::Rng) -> Result<Vec<DnsRecord>, DnsError> {
        let content = fs::read_to_string(&self.path).map_err(|e| DnsError::FileOpen {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut roots: Vec<DnsRecord> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|host| DnsRecord::name_server(ROOT_OWNER, host))
            .collect();

        if roots.len() > 1 {
            let split = rng.usize(..roots.len());
            roots.rotate_left(split);
        }

        debug!(path = %self.path.display(), count = roots.len(), "Root hints loaded");
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn hints_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn targets(roots: &[DnsRecord]) -> Vec<&str> {
        roots.iter().filter_map(DnsRecord::target_name).collect()
    }

    #[test]
    fn test_missing_file() {
        let hints = RootHints::new("/nonexistent/mailnet/dnsroots");
        assert!(matches!(hints.load(), Err(DnsError::FileOpen { .. })));
    }

    #[test]
    fn test_single_entry_not_rotated() {
        let file = hints_file("a.root-servers.test\n");
        let roots = RootHints::new(file.path()).load().unwrap();

        assert_eq!(targets(&roots), vec!["a.root-servers.test"]);
        assert_eq!(roots[0].name, ROOT_OWNER);
    }

    #[test]
    fn test_rotation_keeps_cyclic_order() {
        let file = hints_file("a\nb\n\nc\r\nd\n");
        let hints = RootHints::new(file.path());
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..20 {
            let roots = hints.load_with(&mut rng).unwrap();
            let names = targets(&roots);
            assert_eq!(names.len(), 4);

            let start = ["a", "b", "c", "d"]
                .iter()
                .position(|n| *n == names[0])
                .unwrap();
            for (i, name) in names.iter().enumerate() {
                assert_eq!(*name, ["a", "b", "c", "d"][(start + i) % 4]);
            }
        }
    }
}
