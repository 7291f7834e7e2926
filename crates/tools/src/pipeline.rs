//! 学習パイプライン
//!
//! 1. 入力リスト結合と複製数の決定
//! 2. 作業ディレクトリ初期化（`config.json`）
//! 3. `import-images` で DB 作成
//! 4. `finetune-generate.py` で prototxt / train.sh 生成
//! 5. `train.sh` 実行（出力を `train.log` に tee）
//! 6. `solver.log` 抽出と best snapshot 選択
//! 7. モデルディレクトリへの書き出し
//!
//! best snapshot が選べなかった場合は 7 に進まない。

use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use chrono::Local;
use fcn_snapshot::{EvaluationRecord, LogFormat, Selection, SnapshotNaming, select_best_with};
use serde::Serialize;

use crate::common::io::{open_reader, read_lines};
use crate::common::process::{resolve_tool, run_step, run_step_tee};
use crate::export::{ExportedModel, export_model};
use crate::finetune::{FinetuneConfig, init_dir};
use crate::lists::{DEFAULT_FOLDS, DEFAULT_MAX_REPLICATES, concat_lists, replicates, write_list};
use crate::report::{log_malformed, print_selection};

pub const IMPORT_IMAGES: &str = "import-images";
pub const FINETUNE_GENERATE: &str = "finetune-generate.py";
pub const TRAIN_SCRIPT: &str = "train.sh";

pub const LIST_FILE: &str = "list";
pub const DB_DIR: &str = "db";
pub const CACHE_DIR: &str = "cache";
pub const TRAIN_LOG: &str = "train.log";
pub const SOLVER_LOG: &str = "solver.log";
pub const RUN_SUMMARY: &str = "run.json";

/// solver の出力行に含まれるソースファイル名
pub const DEFAULT_SOLVER_FILTER: &str = "solver.cpp";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 書き出し先（存在してはならない）
    pub model_dir: PathBuf,
    /// 作業ディレクトリ（存在してはならない）
    pub work_dir: PathBuf,
    pub inputs: Vec<PathBuf>,
    /// 外部ツールの配置ディレクトリ
    pub bin_dir: PathBuf,
    pub max_replicates: usize,
    pub folds: u32,
    pub finetune: FinetuneConfig,
    pub naming: SnapshotNaming,
    pub format: LogFormat,
    pub solver_filter: String,
}

impl PipelineConfig {
    pub fn new(model_dir: PathBuf, work_dir: PathBuf, inputs: Vec<PathBuf>, bin_dir: PathBuf) -> Self {
        Self {
            model_dir,
            work_dir,
            inputs,
            bin_dir,
            max_replicates: DEFAULT_MAX_REPLICATES,
            folds: DEFAULT_FOLDS,
            finetune: FinetuneConfig::default(),
            naming: SnapshotNaming::default(),
            format: LogFormat::default(),
            solver_filter: DEFAULT_SOLVER_FILTER.to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub selection: Selection,
    pub exported: ExportedModel,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    timestamp: String,
    inputs: Vec<String>,
    entries: usize,
    replicates: usize,
    folds: u32,
    finetune: &'a FinetuneConfig,
    records: &'a [EvaluationRecord],
    best: &'a EvaluationRecord,
    exported: &'a ExportedModel,
}

pub fn run(cfg: &PipelineConfig) -> Result<RunOutcome> {
    if cfg.inputs.is_empty() {
        bail!("at least one input list is required");
    }

    let lines = concat_lists(&cfg.inputs)?;
    let reps = replicates(cfg.max_replicates, lines.len())?;
    println!("{} lines.", lines.len());
    println!("{reps} replicates.");

    for dir in [&cfg.model_dir, &cfg.work_dir] {
        if dir.exists() {
            bail!("{} already exists", dir.display());
        }
    }

    // cwd を変えて実行するステップがあるため先に解決しておく
    let import_images = resolve_tool(&cfg.bin_dir, IMPORT_IMAGES)?;
    let finetune_generate = resolve_tool(&cfg.bin_dir, FINETUNE_GENERATE)?;

    init_dir(&cfg.work_dir, &cfg.finetune)?;
    let list_path = cfg.work_dir.join(LIST_FILE);
    write_list(&list_path, &lines)?;

    run_step(
        IMPORT_IMAGES,
        Command::new(&import_images)
            .arg("-f")
            .arg(cfg.folds.to_string())
            .arg("-R")
            .arg(reps.to_string())
            .arg("--list")
            .arg(&list_path)
            .arg("--output")
            .arg(cfg.work_dir.join(DB_DIR))
            .arg("--cache")
            .arg(cfg.work_dir.join(CACHE_DIR)),
    )?;
    run_step(FINETUNE_GENERATE, Command::new(&finetune_generate).current_dir(&cfg.work_dir))?;

    let train_log = cfg.work_dir.join(TRAIN_LOG);
    run_step_tee(
        TRAIN_SCRIPT,
        Command::new("sh")
            .arg("-c")
            .arg(format!("exec ./{TRAIN_SCRIPT} 2>&1"))
            .current_dir(&cfg.work_dir),
        &train_log,
    )?;

    let solver_log = cfg.work_dir.join(SOLVER_LOG);
    let kept = filter_log(&train_log, &solver_log, &cfg.solver_filter)?;
    log::info!("{kept} solver lines in {}", solver_log.display());

    let selection = select_from_log(&solver_log, &cfg.format)?;
    print_selection(&selection);

    let best = *selection.best();
    let exported = export_model(&cfg.work_dir, &cfg.model_dir, &cfg.naming, best.iteration)?;

    let summary = RunSummary {
        timestamp: Local::now().to_rfc3339(),
        inputs: cfg.inputs.iter().map(|p| p.display().to_string()).collect(),
        entries: lines.len(),
        replicates: reps,
        folds: cfg.folds,
        finetune: &cfg.finetune,
        records: selection.records(),
        best: &best,
        exported: &exported,
    };
    let summary_path = cfg.work_dir.join(RUN_SUMMARY);
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&summary_path, json)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    Ok(RunOutcome {
        selection,
        exported,
    })
}

/// `needle` を含む行だけを `dst` に書き出す（`grep needle src > dst`）
pub fn filter_log(src: &Path, dst: &Path, needle: &str) -> Result<usize> {
    let mut reader = open_reader(src)?;
    let file = File::create(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    let mut writer = BufWriter::new(file);
    let mut kept = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read {}", src.display()))?;
        if n == 0 {
            break;
        }
        if !String::from_utf8_lossy(&buf).contains(needle) {
            continue;
        }
        // 行のバイト列はそのまま写す
        writer.write_all(&buf)?;
        if buf.last() != Some(&b'\n') {
            writer.write_all(b"\n")?;
        }
        kept += 1;
    }
    writer.flush().with_context(|| format!("failed to write {}", dst.display()))?;
    Ok(kept)
}

/// ログファイル全体を読んで best snapshot を選ぶ
pub fn select_from_log(path: &Path, format: &LogFormat) -> Result<Selection> {
    let lines = read_lines(path)?;
    let selection = select_best_with(format, &lines)
        .with_context(|| format!("cannot choose a snapshot from {}", path.display()))?;
    log_malformed(&selection);
    Ok(selection)
}
