//! 入力リストから FCN を fine-tuning し、best snapshot をモデルとして書き出す。
//!
//! ```shell
//! train_caffe_fcn models/fcn runs/fcn-tmp lists/train-a.list lists/train-b.list \
//!   --bin-dir /opt/caffex/bin --max-replicates 2500 --folds 8
//! ```
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fcn_snapshot::{LogFormat, SnapshotNaming};
use fcn_tools::common::process::default_bin_dir;
use fcn_tools::finetune::FinetuneConfig;
use fcn_tools::lists::{DEFAULT_FOLDS, DEFAULT_MAX_REPLICATES};
use fcn_tools::pipeline::{self, DEFAULT_SOLVER_FILTER, PipelineConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fine-tune a Caffe FCN and export the best snapshot")]
struct Cli {
    /// モデル出力ディレクトリ（存在してはならない）
    model: PathBuf,

    /// 作業ディレクトリ（存在してはならない）
    tmp: PathBuf,

    /// 入力画像リスト（1つ以上）
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// import-images / finetune-generate.py の配置先（未指定時: 実行ファイルと同じディレクトリ）
    #[arg(long)]
    bin_dir: Option<PathBuf>,

    /// 複製後の目標サンプル数
    #[arg(long, default_value_t = DEFAULT_MAX_REPLICATES)]
    max_replicates: usize,

    /// fold 数
    #[arg(long, default_value_t = DEFAULT_FOLDS)]
    folds: u32,

    /// config.json の既定値を上書きする TOML ファイル
    #[arg(long)]
    config: Option<PathBuf>,

    /// snapshot ファイル名の prefix
    #[arg(long, default_value = "fcn")]
    snapshot_prefix: String,

    /// snapshot ファイルの拡張子
    #[arg(long, default_value = "caffemodel")]
    snapshot_ext: String,

    /// train.log から solver.log に残す行の目印
    #[arg(long, default_value = DEFAULT_SOLVER_FILTER)]
    solver_filter: String,

    /// 評価開始行のパターン（第1グループ = iteration）
    #[arg(long)]
    marker_pattern: Option<String>,

    /// accuracy 行のパターン（第1グループ = accuracy）
    #[arg(long)]
    accuracy_pattern: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let bin_dir = match cli.bin_dir {
        Some(dir) => dir,
        None => default_bin_dir()?,
    };

    let mut cfg = PipelineConfig::new(cli.model, cli.tmp, cli.inputs, bin_dir);
    cfg.max_replicates = cli.max_replicates;
    cfg.folds = cli.folds;
    cfg.finetune = FinetuneConfig::from_optional_file(cli.config.as_deref())?;
    cfg.naming = SnapshotNaming {
        prefix: cli.snapshot_prefix,
        extension: cli.snapshot_ext,
        ..SnapshotNaming::default()
    };
    cfg.format =
        LogFormat::with_overrides(cli.marker_pattern.as_deref(), cli.accuracy_pattern.as_deref())?;
    cfg.solver_filter = cli.solver_filter;

    let outcome = pipeline::run(&cfg)?;
    println!("wrote model: {}", outcome.exported.dir.display());
    Ok(())
}
