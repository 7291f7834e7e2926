//! ログ・リスト読み込み（gzip対応）と出力先のユーティリティ

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

const READER_BUF_CAP: usize = 128 * 1024; // 128 KiB

fn is_stdio(p: &Path) -> bool {
    p.to_string_lossy() == "-"
}

fn is_gz(p: &Path) -> bool {
    p.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// `-` は stdin、`.gz` は透過的に展開して読む
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, io::stdin())));
    }
    let f = File::open(p).with_context(|| format!("failed to open {}", p.display()))?;
    if is_gz(p) {
        let dec = flate2::read::GzDecoder::new(f);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, f)))
}

/// 全行を読み込む。学習ログは UTF-8 とは限らないので不正なバイトは置換する。
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let p = path.as_ref();
    let mut reader = open_reader(p)?;
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read {}", p.display()))?;
        if n == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        lines.push(text.trim_end_matches(['\n', '\r']).to_owned());
    }
    Ok(lines)
}

/// `-` は stdout、それ以外はファイル（親ディレクトリは必要なら作成）に書く。
/// 書き終えたら `flush` でエラーを拾うこと。
pub fn create_output<P: AsRef<Path>>(path: P) -> Result<BufWriter<Box<dyn Write>>> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(BufWriter::new(Box::new(io::stdout())));
    }
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let f = File::create(p).with_context(|| format!("failed to create {}", p.display()))?;
    Ok(BufWriter::new(Box::new(f)))
}
