//! 入力テキストの内部表現を提供するモジュール
//!
//! このモジュールは、形態素解析のために入力テキストを効率的に処理するための
//! 内部データ構造を提供します。辞書の表層形と素性はUTF-16のコード単位で
//! 格納されているため、入力文字列もコード単位列に変換し、各コード単位の
//! 文字情報とバイト位置のマッピングを計算・保持します。

use std::borrow::Cow;
use std::ops::Range;

use crate::dictionary::character::{CharCategory, CharInfo};

/// 文字の先頭ではないコード単位（サロゲートペアの後半）を表すバイト位置
const NOT_BOUNDARY: usize = usize::MAX;

/// 入力テキストの内部表現を保持する構造体
///
/// # フィールド
///
/// * `input` - 元の入力文字列
/// * `units` - 入力文字列をUTF-16のコード単位に分割した配列
/// * `u2b` - コード単位位置からバイト位置へのマッピング配列
/// * `cinfos` - 各コード単位の文字情報を保持する配列
#[derive(Default, Clone, Debug)]
pub struct Sentence {
    input: String,
    units: Vec<u16>,
    u2b: Vec<usize>,
    cinfos: Vec<CharInfo>,
}

impl Sentence {
    /// 新しい空の `Sentence` インスタンスを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします
    #[inline(always)]
    pub fn clear(&mut self) {
        self.input.clear();
        self.units.clear();
        self.u2b.clear();
        self.cinfos.clear();
    }

    /// 入力文字列を設定します
    ///
    /// 既存の内部状態をクリアした後、新しい入力文字列を設定します。
    /// この時点では文字列の解析は行われません。解析を行うには [`compile`]
    /// を呼び出す必要があります。
    ///
    /// [`compile`]: Self::compile
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    /// 入力文字列を解析し、内部データ構造を構築します
    ///
    /// # 引数
    ///
    /// * `char_cat` - 文字カテゴリ表
    pub fn compile(&mut self, char_cat: &CharCategory) {
        self.compute_basic();
        self.compute_categories(char_cat);
    }

    /// コード単位列とバイト位置マッピングを計算します
    fn compute_basic(&mut self) {
        let mut buf = [0; 2];
        for (bi, ch) in self.input.char_indices() {
            let encoded = ch.encode_utf16(&mut buf);
            self.units.extend_from_slice(encoded);
            self.u2b.push(bi);
            if encoded.len() == 2 {
                self.u2b.push(NOT_BOUNDARY);
            }
        }
        self.u2b.push(self.input.len());
    }

    /// 各コード単位の文字情報を計算します
    fn compute_categories(&mut self, char_cat: &CharCategory) {
        self.cinfos.reserve(self.units.len());
        for &u in &self.units {
            self.cinfos.push(char_cat.char_info(u));
        }
    }

    /// 元の入力文字列への参照を返します
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    /// コード単位列への参照を返します
    #[inline(always)]
    pub fn units(&self) -> &[u16] {
        &self.units
    }

    /// コード単位数を返します
    #[inline(always)]
    pub fn len_unit(&self) -> usize {
        self.units.len()
    }

    /// 指定されたコード単位位置に対応するバイト位置を返します
    ///
    /// サロゲートペアの後半を指す場合は`None`を返します。
    #[inline(always)]
    pub fn byte_position(&self, pos_unit: usize) -> Option<usize> {
        match self.u2b[pos_unit] {
            NOT_BOUNDARY => None,
            b => Some(b),
        }
    }

    /// 指定されたコード単位範囲の文字列を返します
    ///
    /// 範囲の両端が文字の境界であれば元の文字列のスライスを借用し、
    /// そうでなければ置換文字を用いてデコードした文字列を返します。
    pub fn surface(&self, range_unit: Range<usize>) -> Cow<'_, str> {
        match (
            self.byte_position(range_unit.start),
            self.byte_position(range_unit.end),
        ) {
            (Some(b), Some(e)) => Cow::Borrowed(&self.input[b..e]),
            _ => Cow::Owned(String::from_utf16_lossy(&self.units[range_unit])),
        }
    }

    /// 指定された位置の文字情報を返します
    #[inline(always)]
    pub fn char_info(&self, pos_unit: usize) -> CharInfo {
        self.cinfos[pos_unit]
    }
}
