//! Location normalization.
//!
//! Scheme-prefixed URIs pass through untouched. Everything else is a local
//! path: `~` is expanded, the path is made absolute against the working
//! directory, and `.`/`..` components are folded lexically. The filesystem
//! is never consulted, so a path that does not exist yet normalizes fine.

use std::path::{Component, Path, PathBuf};

use vecdb_types::known_scheme;

/// Normalizes locations against a home directory and working directory.
#[derive(Debug, Clone, Default)]
pub struct UriNormalizer {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl UriNormalizer {
    /// Normalizer with explicit home and working directories.
    pub fn new(home: Option<PathBuf>, cwd: Option<PathBuf>) -> Self {
        Self { home, cwd }
    }

    /// Normalizer using the current user's home and the process working
    /// directory.
    pub fn from_process() -> Self {
        Self {
            home: directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
            cwd: std::env::current_dir().ok(),
        }
    }

    pub fn normalize(&self, input: impl AsRef<Path>) -> String {
        let raw = input.as_ref().to_string_lossy();
        if known_scheme(&raw).is_some() {
            return raw.into_owned();
        }

        // Fold `.`/`..` first so a `~` they uncover is expanded in this pass
        let cleaned = lexical_clean(Path::new(&*raw));
        let cleaned = cleaned.to_string_lossy();
        let expanded = shellexpand::tilde_with_context(&*cleaned, || {
            self.home
                .as_ref()
                .map(|home| home.to_string_lossy().into_owned())
        });

        let path = PathBuf::from(expanded.into_owned());
        let absolute = match &self.cwd {
            Some(cwd) if path.is_relative() => cwd.join(path),
            _ => path,
        };

        lexical_clean(&absolute).to_string_lossy().into_owned()
    }
}

/// Normalize `input` against the process environment.
pub fn normalize_uri(input: impl AsRef<Path>) -> String {
    UriNormalizer::from_process().normalize(input)
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // ".." above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> UriNormalizer {
        UriNormalizer::new(
            Some(PathBuf::from("/home/alice")),
            Some(PathBuf::from("/work/project")),
        )
    }

    #[test]
    fn test_schemes_unchanged() {
        let n = normalizer();
        for uri in [
            "s3://bucket/db",
            "s3+ddb://bucket/db?ddbTableName=t",
            "gs://bucket/./db/../x",
            "az://container/db",
            "db://mydb",
            "file:///srv/db",
            "memory://",
            "http://localhost:8080",
            "https://example.com/db",
        ] {
            assert_eq!(n.normalize(uri), uri);
        }
    }

    #[test]
    fn test_home_expansion() {
        let n = normalizer();
        assert_eq!(n.normalize("~/.lancedb"), "/home/alice/.lancedb");
        assert_eq!(n.normalize("~"), "/home/alice");
    }

    #[test]
    fn test_relative_resolution() {
        let n = normalizer();
        assert_eq!(n.normalize("data/db"), "/work/project/data/db");
        assert_eq!(n.normalize("./data/../db/"), "/work/project/db");
        assert_eq!(n.normalize("../../../../db"), "/db");
        assert_eq!(n.normalize(""), "/work/project");
    }

    #[test]
    fn test_absolute_path_cleaned() {
        let n = normalizer();
        assert_eq!(n.normalize("/var//lib/./db/"), "/var/lib/db");
        assert_eq!(n.normalize(Path::new("/var/lib/db")), "/var/lib/db");
    }

    #[test]
    fn test_uppercase_scheme_is_a_path() {
        let n = normalizer();
        assert_eq!(n.normalize("S3://bucket"), "/work/project/S3:/bucket");
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        for input in [
            "~/.lancedb",
            "~",
            "rel/./path/..",
            "/abs/path/",
            "",
            "s3://bucket/db",
            "gs://b/d",
            "az://c/d",
            "db://mydb",
            "https://h/db",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_idempotent_without_home_or_cwd() {
        let n = UriNormalizer::new(None, None);
        for input in ["~/db", "rel/../x", "../up", "/abs", "./~/db"] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {input:?}");
        }
        assert_eq!(n.normalize("rel/../x"), "x");
        assert_eq!(n.normalize("../up"), "../up");
    }

    #[test]
    fn test_idempotent_with_home_but_no_cwd() {
        let n = UriNormalizer::new(Some(PathBuf::from("/home/alice")), None);
        for input in ["./~/db", "a/../~/db", "~/x/../db", "rel/db", "../up"] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {input:?}");
        }
        assert_eq!(n.normalize("./~/db"), "/home/alice/db");
        assert_eq!(n.normalize("a/../~/db"), "/home/alice/db");
        assert_eq!(n.normalize("rel/db"), "rel/db");
    }
}
