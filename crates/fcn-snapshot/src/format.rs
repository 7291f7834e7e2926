//! ログ行フォーマット（marker 行 / accuracy 行のパターン）

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SelectError, SelectResult};

/// `I0127 11:24:15.227892 27000 solver.cpp:340] Iteration 552, Testing net (#0)`
pub const DEFAULT_MARKER_PATTERN: &str = r"Iteration (\d+), Testing";

/// `I0127 11:24:15.283869 27000 solver.cpp:408]     Test net output #0: accuracy = 0.975`
pub const DEFAULT_ACCURACY_PATTERN: &str =
    r"accuracy = ([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_MARKER_PATTERN).expect("invalid MARKER_RE pattern"));
static ACCURACY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_ACCURACY_PATTERN).expect("invalid ACCURACY_RE pattern"));

/// 評価レコードを構成する2行のパターン。
///
/// どちらのパターンも第1キャプチャグループが数値トークン（iteration / accuracy）を指す。
#[derive(Debug, Clone)]
pub struct LogFormat {
    marker: Regex,
    accuracy: Regex,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self {
            marker: MARKER_RE.clone(),
            accuracy: ACCURACY_RE.clone(),
        }
    }
}

impl LogFormat {
    /// カスタムパターンから構築する。
    pub fn new(marker: &str, accuracy: &str) -> SelectResult<Self> {
        Ok(Self {
            marker: compile("marker", marker)?,
            accuracy: compile("accuracy", accuracy)?,
        })
    }

    /// 既定パターンのうち指定されたものだけを差し替える。
    pub fn with_overrides(marker: Option<&str>, accuracy: Option<&str>) -> SelectResult<Self> {
        Self::new(
            marker.unwrap_or(DEFAULT_MARKER_PATTERN),
            accuracy.unwrap_or(DEFAULT_ACCURACY_PATTERN),
        )
    }

    pub fn marker_pattern(&self) -> &str {
        self.marker.as_str()
    }

    pub fn accuracy_pattern(&self) -> &str {
        self.accuracy.as_str()
    }

    /// marker 行なら iteration トークンを返す
    pub fn marker_token<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&self.marker, line)
    }

    /// accuracy 行なら accuracy トークンを返す
    pub fn accuracy_token<'a>(&self, line: &'a str) -> Option<&'a str> {
        first_capture(&self.accuracy, line)
    }
}

fn compile(kind: &'static str, pattern: &str) -> SelectResult<Regex> {
    let re = Regex::new(pattern).map_err(|e| SelectError::InvalidPattern {
        kind,
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })?;
    // captures_len() はグループ0（マッチ全体）を含む
    if re.captures_len() < 2 {
        return Err(SelectError::InvalidPattern {
            kind,
            pattern: pattern.to_owned(),
            reason: "pattern needs a capture group for the value".to_owned(),
        });
    }
    Ok(re)
}

fn first_capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}
