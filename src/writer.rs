use crate::error::WriteError;
use crate::scanner::ExtractionUnit;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// A unit that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Joins a heading path onto the destination root.
///
/// Heading paths start with `/` but are always relative to `root`.
pub fn resolve_target(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

/// Writes one unit under `root`, creating parent directories and replacing any
/// existing file.
pub async fn materialize(root: &Path, unit: &ExtractionUnit) -> Result<Written, WriteError> {
    let target = resolve_target(root, &unit.path);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    write_file(&target, &unit.content)
        .await
        .map_err(|source| WriteError::Write {
            path: target.clone(),
            source,
        })?;

    debug!(
        "Wrote {} ({} bytes{})",
        target.display(),
        unit.content.len(),
        unit.language
            .as_deref()
            .map(|l| format!(", {l}"))
            .unwrap_or_default()
    );

    Ok(Written {
        path: target,
        bytes: unit.content.len(),
    })
}

async fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o644);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn unit(path: &str, content: &str) -> ExtractionUnit {
        ExtractionUnit {
            path: path.to_owned(),
            content: content.as_bytes().to_vec(),
            language: None,
        }
    }

    #[test]
    fn resolves_leading_slash_under_root() {
        let root = Path::new("/tmp/out");
        assert_eq!(resolve_target(root, "/src/a.rs"), root.join("src/a.rs"));
        assert_eq!(resolve_target(root, "src/a.rs"), root.join("src/a.rs"));
        assert_eq!(resolve_target(root, "//a.rs"), root.join("a.rs"));
    }

    #[tokio::test]
    async fn creates_missing_directories() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let written = materialize(dir.path(), &unit("/a/b/c/deep.txt", "deep\n")).await?;

        assert_eq!(written.path, dir.path().join("a/b/c/deep.txt"));
        assert_eq!(written.bytes, 5);
        assert_eq!(std::fs::read_to_string(&written.path)?, "deep\n");
        Ok(())
    }

    #[tokio::test]
    async fn overwrites_existing_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        std::fs::create_dir_all(dir.path().join("src"))?;
        std::fs::write(dir.path().join("src/a.txt"), "a much longer old body\n")?;

        materialize(dir.path(), &unit("/src/a.txt", "new\n")).await?;

        assert_eq!(std::fs::read_to_string(dir.path().join("src/a.txt"))?, "new\n");
        Ok(())
    }

    #[tokio::test]
    async fn writes_empty_content() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let written = materialize(dir.path(), &unit("/empty", "")).await?;
        assert_eq!(written.bytes, 0);
        assert_eq!(std::fs::metadata(&written.path)?.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn writes_bytes_verbatim() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let raw = ExtractionUnit {
            path: "/latin1.txt".to_owned(),
            content: b"caf\xe9\n".to_vec(),
            language: None,
        };

        let written = materialize(dir.path(), &raw).await?;

        assert_eq!(std::fs::read(&written.path)?, b"caf\xe9\n");
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn new_files_are_not_executable() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let written = materialize(dir.path(), &unit("/run.sh", "echo hi\n")).await?;
        let mode = std::fs::metadata(&written.path)?.permissions().mode();
        assert_eq!(mode & 0o111, 0);
        Ok(())
    }

    #[tokio::test]
    async fn reports_directory_failure() -> anyhow::Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("blocker"), "i am a file")?;

        let err = materialize(dir.path(), &unit("/blocker/inner.txt", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, WriteError::CreateDir { .. }));
        assert_eq!(err.path(), dir.path().join("blocker").as_path());
        Ok(())
    }

    #[tokio::test]
    async fn reports_write_failure() -> anyhow::Result<()> {
        let dir = tempdir()?;
        std::fs::create_dir_all(dir.path().join("taken"))?;

        let err = materialize(dir.path(), &unit("/taken", "x")).await.unwrap_err();

        assert!(matches!(err, WriteError::Write { .. }));
        Ok(())
    }
}
