//! モデルファイルの探索 Outbound ポート

use common::domain::ModelPath;
use common::error::Error;
use std::path::Path;

/// ディレクトリからモデルファイルを探す
pub trait ModelLocator {
    /// ディレクトリが存在するか
    fn dir_exists(&self, dir: &Path) -> bool;
    fn create_dir(&self, dir: &Path) -> Result<(), Error>;
    /// 拡張子が一致する通常ファイルのうち、名前順で最初のもの
    fn find_first(&self, dir: &Path, extension: &str) -> Result<Option<ModelPath>, Error>;
}
