//! 入力画像リストの結合と複製数の計算

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::common::io::read_lines;

/// import-images が複製後に目指すサンプル数
pub const DEFAULT_MAX_REPLICATES: usize = 2500;
/// import-images の fold 数
pub const DEFAULT_FOLDS: u32 = 8;

/// 全リストを順番どおりに連結する。空行は捨てる。
pub fn concat_lists(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for path in paths {
        let before = lines.len();
        lines.extend(read_lines(path)?.into_iter().filter(|l| !l.trim().is_empty()));
        log::debug!("{}: {} entries", path.display(), lines.len() - before);
    }
    Ok(lines)
}

/// `ceil(max_replicates / entries)`
pub fn replicates(max_replicates: usize, entries: usize) -> Result<usize> {
    if entries == 0 {
        bail!("input lists contain no entries");
    }
    Ok(max_replicates.div_ceil(entries).max(1))
}

pub fn write_list(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush().with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
