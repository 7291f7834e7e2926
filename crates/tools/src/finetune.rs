//! fine-tuning 設定（`config.json`）
//!
//! 後段の `finetune-generate.py` が読む設定ファイルを生成する。キー順は固定で、
//! TOML ファイルに書かれたキーだけが既定値を上書きする。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    #[serde(rename = "LMDB")]
    Lmdb,
    #[serde(rename = "LEVELDB")]
    LevelDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "CPU")]
    Cpu,
}

/// `config.json` の内容。フィールド順がそのまま出力のキー順になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinetuneConfig {
    /// ネットワークテンプレート名
    pub template: String,
    pub backend: Backend,
    pub train_source: String,
    pub train_batch: u32,
    pub val_source: String,
    pub val_batch: u32,
    /// 1回の評価で回す validation バッチ数
    pub val_batches: u32,
    /// 出力クラス数
    pub num_output: u32,
    pub val_interval: u32,
    pub display_interval: u32,
    pub snapshot_interval: u32,
    pub max_iter: u32,
    pub device: Device,
}

impl Default for FinetuneConfig {
    fn default() -> Self {
        Self {
            template: "fcn".to_owned(),
            backend: Backend::Lmdb,
            train_source: "db/train".to_owned(),
            train_batch: 1,
            val_source: "db/val".to_owned(),
            val_batch: 1,
            val_batches: 19,
            num_output: 2,
            val_interval: 1000,
            display_interval: 1000,
            snapshot_interval: 1000,
            max_iter: 15000,
            device: Device::Gpu,
        }
    }
}

impl FinetuneConfig {
    /// TOML の上書きファイルを読む（未指定キーは既定値）
    pub fn load_overrides(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// 省略時は既定値
    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_overrides(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.train_batch == 0 || self.val_batch == 0 {
            bail!("batch sizes must be >= 1");
        }
        if self.snapshot_interval == 0 || self.val_interval == 0 {
            bail!("snapshot_interval and val_interval must be >= 1");
        }
        if self.num_output == 0 {
            bail!("num_output must be >= 1");
        }
        Ok(())
    }

    /// 4スペースインデントの JSON
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser).context("failed to serialize fine-tuning config")?;
        buf.push(b'\n');
        Ok(String::from_utf8(buf)?)
    }
}

/// fine-tuning 作業ディレクトリを初期化して `config.json` のパスを返す。
///
/// `.` 以外は新規作成で、既に存在する場合はエラー。
pub fn init_dir(dir: &Path, config: &FinetuneConfig) -> Result<PathBuf> {
    if dir != Path::new(".") {
        fs::create_dir(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let path = dir.join(CONFIG_FILE_NAME);
    fs::write(&path, config.to_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(path)
}
