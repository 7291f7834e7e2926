//! solver log から best snapshot を選ぶ（学習は行わない）。
//!
//! ```shell
//! select_snapshot runs/fcn-tmp/solver.log --csv runs/fcn-tmp/accuracy.csv
//! ```
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fcn_snapshot::{LogFormat, SnapshotNaming};
use fcn_tools::common::io::create_output;
use fcn_tools::pipeline::select_from_log;
use fcn_tools::report::{print_selection, write_csv};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick the best-accuracy snapshot from a Caffe solver log")]
struct Cli {
    /// solver / train ログ（`.gz` 可、`-` で stdin）
    input_log: PathBuf,

    /// 評価レコードの CSV 出力先（`-` で stdout）
    #[arg(long)]
    csv: Option<PathBuf>,

    /// snapshot ファイル名の prefix（best のファイル名表示用）
    #[arg(long, default_value = "fcn")]
    snapshot_prefix: String,

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
    let format =
        LogFormat::with_overrides(cli.marker_pattern.as_deref(), cli.accuracy_pattern.as_deref())?;
    let selection = select_from_log(&cli.input_log, &format)?;

    let csv_to_stdout = cli.csv.as_ref().is_some_and(|p| p.as_os_str() == "-");
    if !csv_to_stdout {
        print_selection(&selection);
    }
    if let Some(path) = &cli.csv {
        let mut out = create_output(path)?;
        write_csv(&mut out, &selection)?;
        out.flush().with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} records to {}", selection.records().len(), path.display());
    }

    let naming = SnapshotNaming {
        prefix: cli.snapshot_prefix,
        ..SnapshotNaming::default()
    };
    log::info!(
        "best snapshot: {}",
        naming.path_in(Path::new(""), selection.best().iteration).display()
    );
    Ok(())
}
