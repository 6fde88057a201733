//! FileSystem ポート経由でモデルファイルを探す ModelLocator 実装

use crate::ports::outbound::ModelLocator;
use common::domain::ModelPath;
use common::error::Error;
use common::ports::outbound::FileSystem;
use std::path::Path;
use std::sync::Arc;

pub struct FsModelLocator {
    fs: Arc<dyn FileSystem>,
}

impl FsModelLocator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

impl ModelLocator for FsModelLocator {
    fn dir_exists(&self, dir: &Path) -> bool {
        self.fs.metadata(dir).map(|m| m.is_dir()).unwrap_or(false)
    }

    fn create_dir(&self, dir: &Path) -> Result<(), Error> {
        self.fs.create_dir_all(dir)
    }

    fn find_first(&self, dir: &Path, extension: &str) -> Result<Option<ModelPath>, Error> {
        let mut candidates: Vec<_> = self
            .fs
            .read_dir(dir)?
            .into_iter()
            .filter(|p| has_extension(p, extension))
            .filter(|p| self.fs.metadata(p).map(|m| m.is_file()).unwrap_or(false))
            .collect();
        // read_dir の順序は OS 依存なので名前順にそろえる
        candidates.sort();
        Ok(candidates.into_iter().next().map(ModelPath::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::StdFileSystem;

    fn locator() -> FsModelLocator {
        FsModelLocator::new(Arc::new(StdFileSystem))
    }

    #[test]
    fn test_finds_first_sorted_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-model.gguf"), b"x").unwrap();
        std::fs::write(dir.path().join("a-model.GGUF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let found = locator().find_first(dir.path(), "gguf").unwrap().unwrap();
        assert_eq!(found.file_name(), "a-model.GGUF");
    }

    #[test]
    fn test_ignores_directories_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a.gguf")).unwrap();
        std::fs::write(dir.path().join("z.gguf"), b"x").unwrap();
        let found = locator().find_first(dir.path(), ".gguf").unwrap().unwrap();
        assert_eq!(found.file_name(), "z.gguf");
    }

    #[test]
    fn test_empty_dir_gives_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locator().dir_exists(dir.path()));
        assert!(locator().find_first(dir.path(), "gguf").unwrap().is_none());
        assert!(!locator().dir_exists(&dir.path().join("missing")));
    }
}
