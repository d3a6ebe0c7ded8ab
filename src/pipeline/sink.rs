//! Filesystem sink for finished MP3 files.
//!
//! Existence of the final file is the only record that an item is done, so a
//! file must never appear at its final path until it is complete.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// An item is complete once its output file exists.
pub fn is_complete(path: &Path) -> bool {
    path.is_file()
}

pub async fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await
}

/// Write `bytes` to a hidden sibling, fsync it, then rename it into place.
///
/// The temporary file is removed if any step fails.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let partial = partial_path(path)?;
    let result = write_then_rename(&partial, path, bytes).await;
    if result.is_err() {
        let _ = fs::remove_file(&partial).await;
    }
    result
}

async fn write_then_rename(partial: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(partial).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(partial, path).await
}

fn partial_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("no file name in {}", path.display())))?;
    Ok(path.with_file_name(format!(".{}.partial", name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_write_leaves_only_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dog.mp3");

        assert!(!is_complete(&path));
        write_atomic(&path, b"first").await.unwrap();
        assert!(is_complete(&path));
        assert_eq!(entries(dir.path()), ["dog.mp3"]);

        write_atomic(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(entries(dir.path()), ["dog.mp3"]);
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the destination makes the rename fail
        let path = dir.path().join("taken.mp3");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_atomic(&path, b"data").await.is_err());
        assert_eq!(entries(dir.path()), ["taken.mp3"]);
        assert!(!is_complete(&path));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.mp3");
        assert!(write_atomic(&path, b"data").await.is_err());

        ensure_dir(path.parent().unwrap()).await.unwrap();
        write_atomic(&path, b"data").await.unwrap();
        assert!(is_complete(&path));
    }

    #[test]
    fn test_partial_name_is_hidden_sibling() {
        let partial = partial_path(Path::new("out/dots/1.mp3")).unwrap();
        assert_eq!(partial, Path::new("out/dots/.1.mp3.partial"));
    }
}
