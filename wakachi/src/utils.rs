//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! このモジュールには、CSV処理、件数の検証、その他のヘルパー関数が含まれています。
//! 主に以下の機能を提供します：
//!
//! - 辞書ファイル中の件数をusizeへ検証付きで変換する関数
//! - CSV行の解析と引用符処理
//! - テスト用のマクロ

use csv_core::ReadFieldResult;

use crate::errors::{Result, WakachiError};

/// 辞書ファイルから読み込んだ符号付き整数を、件数や添字として使える`usize`に変換します。
///
/// # 引数
///
/// * `value` - 変換する値
/// * `file` - エラーメッセージに含める辞書ファイル名
/// * `what` - 値の意味（例: `"nodeCount"`）
///
/// # エラー
///
/// `value`が負の場合、[`WakachiError`]を返します。
#[inline]
pub(crate) fn to_count(value: i32, file: &'static str, what: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        WakachiError::invalid_format(file, format!("{what} must be non-negative, got {value}"))
    })
}

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
/// 4096バイトを超えるフィールドは複数回に分けて読み込まれます。
///
/// # 例
///
/// ```
/// # use wakachi::utils::parse_csv_row;
/// let fields = parse_csv_row("名詞,トスカーナ");
/// assert_eq!(fields, vec!["名詞", "トスカーナ"]);
///
/// let fields_with_quote = parse_csv_row("名詞,\"1,2-ジクロロエタン\"");
/// assert_eq!(fields_with_quote, vec!["名詞", "1,2-ジクロロエタン"]);
/// ```
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut features = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    let mut field = vec![];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        field.extend_from_slice(&output[..nout]);
        bytes = &bytes[nin..];
        let end = match result {
            ReadFieldResult::OutputFull => continue,
            ReadFieldResult::Field { record_end } => record_end,
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
        };
        features.push(String::from_utf8_lossy(&field).into_owned());
        field.clear();
        if end {
            break;
        }
    }
    features
}

#[cfg(test)]
/// HashMapリテラルを簡潔に記述するためのマクロ
///
/// # 例
///
/// ```ignore
/// let map = hashmap! {
///     "key1" => "value1",
///     "key2" => "value2",
/// };
/// ```
macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = hashbrown::HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

#[cfg(test)]
pub(crate) use hashmap;
