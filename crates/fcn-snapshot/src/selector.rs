//! 評価レコードの抽出と best snapshot の選択
//!
//! marker 行を見つけたら直後の1行だけを accuracy 行として読む（2行先読み）。
//! それ以外の位置にある accuracy 表記は評価レコードとして扱わない。

use serde::Serialize;

use crate::error::{MalformedRecord, SelectError, SelectResult};
use crate::format::LogFormat;

/// 1回の評価パスの結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub iteration: u64,
    pub accuracy: f64,
    /// marker 行の行番号（1-based、診断用）
    pub line_no: usize,
}

impl EvaluationRecord {
    pub fn pair(&self) -> (u64, f64) {
        (self.iteration, self.accuracy)
    }
}

/// 1回の走査で得られた全レコード
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub records: Vec<EvaluationRecord>,
    pub malformed: Vec<MalformedRecord>,
}

impl Scan {
    /// 最大 accuracy のレコードを選ぶ。同点は先に現れたものを優先する。
    pub fn into_selection(self) -> SelectResult<Selection> {
        let Some(first) = self.records.first() else {
            return Err(SelectError::NoEvaluationsFound);
        };
        let mut best_index = 0;
        let mut best_accuracy = first.accuracy;
        for (idx, record) in self.records.iter().enumerate().skip(1) {
            if record.accuracy > best_accuracy {
                best_index = idx;
                best_accuracy = record.accuracy;
            }
        }
        Ok(Selection {
            records: self.records,
            malformed: self.malformed,
            best_index,
        })
    }
}

/// 選択結果
///
/// `best_index` は常に `records` の有効な添字なので、フィールドは外から変更させない。
///
/// ```compile_fail
/// let mut selection = fcn_snapshot::select_best(["Iteration 1, Testing", "accuracy = 0.5"]).unwrap();
/// selection.records.clear();
/// ```
#[derive(Debug, Clone)]
pub struct Selection {
    records: Vec<EvaluationRecord>,
    malformed: Vec<MalformedRecord>,
    best_index: usize,
}

impl Selection {
    pub fn best(&self) -> &EvaluationRecord {
        &self.records[self.best_index]
    }

    /// ログ中の出現順（空になることはない）
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// 走査中に破棄したレコード
    pub fn malformed(&self) -> &[MalformedRecord] {
        &self.malformed
    }

    pub fn best_index(&self) -> usize {
        self.best_index
    }

    pub fn pairs(&self) -> Vec<(u64, f64)> {
        self.records.iter().map(EvaluationRecord::pair).collect()
    }
}

/// ログ行を先頭から1回走査して評価レコードを集める。
pub fn scan<I, S>(format: &LogFormat, lines: I) -> Scan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Scan::default();
    let mut lines = lines.into_iter().enumerate();

    while let Some((idx, line)) = lines.next() {
        let line_no = idx + 1;
        let Some(raw) = format.marker_token(line.as_ref()) else {
            continue;
        };
        let iteration = match raw.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                // marker とみなさないので次行は消費しない
                discard(
                    &mut out,
                    MalformedRecord::BadIteration {
                        line_no,
                        raw: raw.to_owned(),
                    },
                );
                continue;
            }
        };

        let Some((_, next)) = lines.next() else {
            discard(&mut out, MalformedRecord::MissingAccuracy { line_no, iteration });
            break;
        };
        let Some(raw) = format.accuracy_token(next.as_ref()) else {
            discard(&mut out, MalformedRecord::MissingAccuracy { line_no, iteration });
            continue;
        };
        match raw.parse::<f64>() {
            Ok(accuracy) if !accuracy.is_nan() => out.records.push(EvaluationRecord {
                iteration,
                accuracy,
                line_no,
            }),
            _ => discard(
                &mut out,
                MalformedRecord::BadAccuracy {
                    line_no,
                    iteration,
                    raw: raw.to_owned(),
                },
            ),
        }
    }

    out
}

fn discard(out: &mut Scan, record: MalformedRecord) {
    log::debug!("discarding evaluation record: {record}");
    out.malformed.push(record);
}

/// 既定フォーマットで走査して best を選ぶ
pub fn select_best<I, S>(lines: I) -> SelectResult<Selection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    select_best_with(&LogFormat::default(), lines)
}

pub fn select_best_with<I, S>(format: &LogFormat, lines: I) -> SelectResult<Selection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    scan(format, lines).into_selection()
}
