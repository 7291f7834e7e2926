//! Caffe solver log からの best snapshot 選択
//!
//! `Iteration <N>, Testing` の marker 行と、その直後の `accuracy = <F>` 行の組を
//! 評価レコードとして抽出し、最も accuracy の高い iteration を選ぶ。
//! ログの取得やファイルコピーは呼び出し側の責務で、この crate は I/O を行わない。

pub mod error;
pub mod format;
pub mod naming;
pub mod selector;

pub use error::{MalformedRecord, SelectError, SelectResult};
pub use format::LogFormat;
pub use naming::SnapshotNaming;
pub use selector::{EvaluationRecord, Scan, Selection, scan, select_best, select_best_with};
