//! fine-tuning 作業ディレクトリを初期化して `config.json` を書く。
//!
//! ```shell
//! finetune_init runs/fcn-20270127
//! finetune_init runs/fcn-cpu --config overrides.toml
//! ```
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fcn_tools::finetune::{FinetuneConfig, init_dir};

#[derive(Parser, Debug)]
#[command(author, version, about = "Initialise a fine-tuning directory with config.json")]
struct Cli {
    /// 作業ディレクトリ（`.` 以外は新規作成）
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// 既定値を上書きする TOML ファイル
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = FinetuneConfig::from_optional_file(cli.config.as_deref())?;
    let path = init_dir(&cli.dir, &config)?;
    println!("{}", path.display());
    Ok(())
}
