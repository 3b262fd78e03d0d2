use qfm_types::{FileStat, FileSystemGateway, FmError, FmResult};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// `FileSystemGateway` over `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystemGateway for StdFileSystem {
    fn list(&self, path: &Path) -> FmResult<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| FmError::io("list", path, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FmError::io("list", path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn stat(&self, path: &Path) -> FmResult<FileStat> {
        let meta = fs::metadata(path).map_err(|e| FmError::io("stat", path, e))?;
        Ok(FileStat {
            size: meta.len(),
            is_dir: meta.is_dir(),
            created: meta.created().ok(),
            modified: meta.modified().ok(),
            accessed: meta.accessed().ok(),
        })
    }

    fn create_file(&self, path: &Path) -> FmResult<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| FmError::io("create file", path, e))
    }

    fn create_dir(&self, path: &Path) -> FmResult<()> {
        fs::create_dir(path).map_err(|e| FmError::io("create directory", path, e))
    }

    fn remove_file(&self, path: &Path) -> FmResult<()> {
        fs::remove_file(path).map_err(|e| FmError::io("remove", path, e))
    }

    fn remove_dir(&self, path: &Path) -> FmResult<()> {
        fs::remove_dir(path).map_err(|e| FmError::io("remove", path, e))
    }

    fn remove_tree(&self, path: &Path) -> FmResult<()> {
        fs::remove_dir_all(path).map_err(|e| FmError::io("purge", path, e))
    }

    fn move_path(&self, from: &Path, to: &Path) -> FmResult<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if err.raw_os_error() == Some(libc::EXDEV) => {
                debug!("cross-device move {:?} -> {:?}, copying", from, to);
                if fs::symlink_metadata(from)
                    .map_err(|e| FmError::io("move", from, e))?
                    .is_dir()
                {
                    self.copy_tree(from, to)?;
                    self.remove_tree(from)
                } else {
                    self.copy_file(from, to)?;
                    self.remove_file(from)
                }
            }
            Err(err) => Err(FmError::io("move", from, err)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> FmResult<()> {
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| FmError::io("copy", from, e))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> FmResult<()> {
        if to.starts_with(from) {
            return Err(FmError::io(
                "copy",
                from,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "cannot copy a directory into itself",
                ),
            ));
        }
        for entry in WalkDir::new(from).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(from).to_path_buf();
                FmError::io("copy", &path, e.into())
            })?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| FmError::io("copy", entry.path(), std::io::Error::other(e)))?;
            let target = to.join(rel);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target).map_err(|e| FmError::io("copy", &target, e))?;
            } else if file_type.is_symlink() {
                let link = fs::read_link(entry.path())
                    .map_err(|e| FmError::io("copy", entry.path(), e))?;
                std::os::unix::fs::symlink(&link, &target)
                    .map_err(|e| FmError::io("copy", &target, e))?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| FmError::io("copy", entry.path(), e))?;
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> FmResult<()> {
        fs::rename(from, to).map_err(|e| FmError::io("rename", from, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let target = dir.path().join("x");
        fs.create_dir(&target).unwrap();
        let err = fs.create_dir(&target).unwrap_err();
        assert!(matches!(err, FmError::IoFailure { .. }));
    }

    #[test]
    fn test_create_file_does_not_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let target = dir.path().join("a.txt");
        std::fs::write(&target, "keep").unwrap();
        assert!(fs.create_file(&target).is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep");
    }

    #[test]
    fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("inner")).unwrap();
        std::fs::write(src.join("inner/f.txt"), "data").unwrap();

        let dst = dir.path().join("dst");
        fs.copy_tree(&src, &dst).unwrap();
        assert_eq!(std::fs::read_to_string(dst.join("inner/f.txt")).unwrap(), "data");
        assert!(src.join("inner/f.txt").exists());
    }

    #[test]
    fn test_copy_tree_into_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        assert!(fs.copy_tree(&src, &src.join("again")).is_err());
    }

    #[test]
    fn test_stat_reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fs = StdFileSystem;
        let stat = fs.stat(dir.path()).unwrap();
        assert!(stat.is_dir);
        assert!(fs.is_dir(dir.path()));
        assert!(!fs.exists(&dir.path().join("missing")));
    }
}
