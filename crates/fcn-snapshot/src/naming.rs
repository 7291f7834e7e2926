//! snapshot ファイル名規則

use std::path::{Path, PathBuf};

/// `<dir>/<prefix>_iter_<iteration>.<extension>` 形式の snapshot 配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    pub dir: String,
    pub prefix: String,
    pub extension: String,
}

impl Default for SnapshotNaming {
    fn default() -> Self {
        Self {
            dir: "snapshots".to_owned(),
            prefix: "fcn".to_owned(),
            extension: "caffemodel".to_owned(),
        }
    }
}

impl SnapshotNaming {
    pub fn file_name(&self, iteration: u64) -> String {
        format!("{}_iter_{}.{}", self.prefix, iteration, self.extension)
    }

    /// 作業ディレクトリ配下の snapshot パス
    pub fn path_in(&self, work_dir: &Path, iteration: u64) -> PathBuf {
        work_dir.join(&self.dir).join(self.file_name(iteration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_naming_matches_solver_output() {
        let naming = SnapshotNaming::default();
        assert_eq!(naming.file_name(552), "fcn_iter_552.caffemodel");
        assert_eq!(
            naming.path_in(Path::new("work"), 15000),
            Path::new("work").join("snapshots").join("fcn_iter_15000.caffemodel")
        );
    }
}
