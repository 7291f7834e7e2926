//! Error types for snapshot selection

/// 選択処理が呼び出し側へ返すエラー
#[derive(thiserror::Error, Debug)]
pub enum SelectError {
    /// ログ中に有効な評価レコードが1件もない
    #[error("no evaluation records found in log")]
    NoEvaluationsFound,

    /// カスタムパターンのコンパイル失敗、またはキャプチャグループ不足
    #[error("invalid {kind} pattern '{pattern}': {reason}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        reason: String,
    },
}

/// 走査中にその場で破棄されたレコード
///
/// `Err` として返されることはなく、`Selection::malformed` に診断用として蓄積される。
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MalformedRecord {
    /// marker 行の iteration が整数として解釈できない（桁あふれ等）
    #[error("line {line_no}: unparsable iteration '{raw}'")]
    BadIteration { line_no: usize, raw: String },

    /// marker 行の直後が accuracy 行ではない
    #[error("line {line_no}: iteration {iteration} is not followed by an accuracy line")]
    MissingAccuracy { line_no: usize, iteration: u64 },

    /// accuracy 行の値が浮動小数として解釈できない
    #[error("line {line_no}: unparsable accuracy '{raw}' for iteration {iteration}")]
    BadAccuracy {
        line_no: usize,
        iteration: u64,
        raw: String,
    },
}

impl MalformedRecord {
    /// 問題のあった行番号（1-based）
    pub fn line_no(&self) -> usize {
        match self {
            Self::BadIteration { line_no, .. }
            | Self::MissingAccuracy { line_no, .. }
            | Self::BadAccuracy { line_no, .. } => *line_no,
        }
    }
}

/// Result type for snapshot selection
pub type SelectResult<T> = Result<T, SelectError>;
