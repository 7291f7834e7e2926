//! 評価レコードの表示と CSV 出力

use std::io::Write;

use anyhow::Result;
use fcn_snapshot::Selection;

pub const CSV_HEADER: [&str; 5] = ["index", "line_no", "iteration", "accuracy", "is_best"];

fn fmt_accuracy(value: f64) -> String {
    format!("{value:.6}")
}

/// 1レコード1行のテキスト表示と best の要約
pub fn print_selection(selection: &Selection) {
    for (idx, record) in selection.records().iter().enumerate() {
        let mark = if idx == selection.best_index() { " *" } else { "" };
        println!(
            "iter={} accuracy={} line={}{mark}",
            record.iteration,
            fmt_accuracy(record.accuracy),
            record.line_no
        );
    }
    let best = selection.best();
    println!("BEST ACCURACY {} AT SNAPSHOT {}", best.accuracy, best.iteration);
}

/// 破棄したレコードを warn で出す
pub fn log_malformed(selection: &Selection) {
    for record in selection.malformed() {
        log::warn!("skipped evaluation: {record}");
    }
}

pub fn write_csv<W: Write>(writer: &mut W, selection: &Selection) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for (idx, record) in selection.records().iter().enumerate() {
        writeln!(
            writer,
            "{},{},{},{},{}",
            idx,
            record.line_no,
            record.iteration,
            fmt_accuracy(record.accuracy),
            idx == selection.best_index()
        )?;
    }
    Ok(())
}
