//! Caffe FCN fine-tuning のオーケストレーション
//!
//! 外部ツール（import-images / finetune-generate.py / train.sh）を順に呼び出し、
//! solver log から best snapshot を選んでモデルディレクトリへ書き出す。

pub mod common;
pub mod export;
pub mod finetune;
pub mod lists;
pub mod pipeline;
pub mod report;
