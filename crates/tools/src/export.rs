//! 学習済みモデルディレクトリの書き出し

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fcn_snapshot::SnapshotNaming;
use serde::Serialize;

/// 作業ディレクトリ側のネットワーク定義（推論用）
pub const DEPLOY_PROTOTXT: &str = "deploy.prototxt";
pub const MODEL_FILE: &str = "caffe.model";
pub const PARAMS_FILE: &str = "caffe.params";
pub const BLOBS_FILE: &str = "blobs";
/// 推論時に取り出す出力 blob
pub const OUTPUT_BLOBS: &[&str] = &["prob"];

#[derive(Debug, Clone, Serialize)]
pub struct ExportedModel {
    pub dir: PathBuf,
    pub model: PathBuf,
    pub params: PathBuf,
    pub blobs: PathBuf,
    /// コピー元の snapshot
    pub snapshot: PathBuf,
}

/// `iteration` の snapshot を `model_dir` に書き出す。
///
/// コピー元が揃っていることを確認してから `model_dir` を作るので、失敗時に
/// 中途半端なディレクトリは残らない。`model_dir` が既に存在する場合はエラー。
pub fn export_model(
    work_dir: &Path,
    model_dir: &Path,
    naming: &SnapshotNaming,
    iteration: u64,
) -> Result<ExportedModel> {
    let deploy = work_dir.join(DEPLOY_PROTOTXT);
    let snapshot = naming.path_in(work_dir, iteration);
    for src in [&deploy, &snapshot] {
        if !src.is_file() {
            bail!("missing export source: {}", src.display());
        }
    }

    fs::create_dir(model_dir)
        .with_context(|| format!("failed to create {}", model_dir.display()))?;

    let exported = ExportedModel {
        dir: model_dir.to_path_buf(),
        model: model_dir.join(MODEL_FILE),
        params: model_dir.join(PARAMS_FILE),
        blobs: model_dir.join(BLOBS_FILE),
        snapshot,
    };
    copy(&deploy, &exported.model)?;
    copy(&exported.snapshot, &exported.params)?;

    let mut blobs = String::new();
    for name in OUTPUT_BLOBS {
        blobs.push_str(name);
        blobs.push('\n');
    }
    fs::write(&exported.blobs, blobs)
        .with_context(|| format!("failed to write {}", exported.blobs.display()))?;

    log::info!(
        "exported {} -> {}",
        exported.snapshot.display(),
        exported.dir.display()
    );
    Ok(exported)
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_dir_with_snapshot(root: &Path, iteration: u64) -> PathBuf {
        let work = root.join("work");
        fs::create_dir_all(work.join("snapshots")).unwrap();
        fs::write(work.join(DEPLOY_PROTOTXT), "name: \"fcn\"\n").unwrap();
        let naming = SnapshotNaming::default();
        fs::write(naming.path_in(&work, iteration), format!("weights@{iteration}")).unwrap();
        work
    }

    #[test]
    fn export_copies_files_and_writes_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let work = work_dir_with_snapshot(dir.path(), 552);
        let model = dir.path().join("model");

        let exported = export_model(&work, &model, &SnapshotNaming::default(), 552).unwrap();
        assert_eq!(fs::read_to_string(&exported.model).unwrap(), "name: \"fcn\"\n");
        assert_eq!(fs::read_to_string(&exported.params).unwrap(), "weights@552");
        assert_eq!(fs::read_to_string(model.join(BLOBS_FILE)).unwrap(), "prob\n");
    }

    #[test]
    fn missing_snapshot_leaves_no_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work = work_dir_with_snapshot(dir.path(), 552);
        let model = dir.path().join("model");

        let err = export_model(&work, &model, &SnapshotNaming::default(), 600).unwrap_err();
        assert!(err.to_string().contains("fcn_iter_600.caffemodel"));
        assert!(!model.exists());
    }

    #[test]
    fn existing_model_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let work = work_dir_with_snapshot(dir.path(), 1000);
        let model = dir.path().join("model");
        fs::create_dir(&model).unwrap();

        assert!(export_model(&work, &model, &SnapshotNaming::default(), 1000).is_err());
    }
}
