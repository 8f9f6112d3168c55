//! # Wakachi
//!
//! Wakachiは、ビタビアルゴリズムに基づく日本語形態素解析（分かち書き）の実装です。
//!
//! ## 概要
//!
//! このライブラリは、Igo形式のバイナリ辞書ディレクトリを読み込み、入力文を
//! 表層形、素性、開始位置からなる形態素の列に分割します。
//! 辞書ファイルはホストと同じバイト順序であればメモリマップで読み込まれ、
//! 異なる場合はストリームとして読み込まれてバイト順序が変換されます。
//!
//! ## 主な機能
//!
//! - **ダブル配列トライ**: テール付きのトライによる完全一致検索と共通接頭辞検索
//! - **未知語処理**: 文字カテゴリに基づく未知語候補の生成とグループ化
//! - **最小コスト解析**: 連接コスト表を用いたラティス上の最小コストパス探索
//! - **辞書の検証**: 解析を始める前に、すべてのファイルの整合性を検証
//!
//! ## 使用例
//!
//! ```no_run
//! use wakachi::dictionary::DictionaryOptions;
//! use wakachi::{Dictionary, Tokenizer};
//!
//! let dict = Dictionary::from_dir("path/to/ipadic", DictionaryOptions::default())?;
//! let tokenizer = Tokenizer::new(dict);
//!
//! let morphemes = tokenizer.parse("私の名前は中野です。")?;
//! assert_eq!(morphemes[0].surface, "私");
//! assert_eq!(morphemes[4].start, 5);
//!
//! let mut worker = tokenizer.new_worker();
//! worker.reset_sentence("こんにちは世界");
//! worker.tokenize()?;
//! for token in worker.token_iter() {
//!     println!("{}\t{}", token.surface(), token.feature());
//! }
//! # Ok::<(), wakachi::errors::WakachiError>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 辞書データ構造と読み込み
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 文の内部表現
mod sentence;

/// トークン型の定義
pub mod token;

/// トークナイザーの実装
pub mod tokenizer;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use dictionary::{Dictionary, DictionaryOptions};
pub use token::{Morpheme, Token};
pub use tokenizer::worker::Worker;
pub use tokenizer::Tokenizer;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
