// digichecks-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `content` through a sibling temporary file, so a
/// reader never observes a half-written registry.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Same directory, so the final rename never crosses filesystems.
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_ref())?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_registry() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("registry.yaml");

        atomic_write(&path, "companies: []\n")?;
        atomic_write(&path, "checks: []\n")?;

        assert_eq!(fs::read_to_string(&path)?, "checks: []\n");
        // No staging file left behind.
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_atomic_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent/registry.yaml");
        assert!(matches!(
            atomic_write(&path, "x"),
            Err(InfrastructureError::Io(_))
        ));
    }
}
