//! 有効化トグル・名言ポーリング・読み上げキューのコアライブラリ。

pub mod domain;
pub mod infra;
pub mod usecase;
