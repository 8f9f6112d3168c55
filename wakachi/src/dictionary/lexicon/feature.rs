//! 単語の素性情報
//!
//! 素性文字列はUTF-16のコード単位列として1つの配列に連結されており、
//! 単語IDごとのオフセットで切り出します。

use crate::dictionary::reader::Array;
use crate::errors::{Result, WakachiError};

/// 単語の素性情報を管理する構造体
#[derive(Debug, Default)]
pub struct WordFeatures {
    offsets: Array<i32>,
    data: Array<u16>,
}

impl WordFeatures {
    /// オフセット配列と素性データから新しいインスタンスを作成します。
    ///
    /// `offsets`は単語数より1つ多い要素を持ち、最後の要素は番兵です。
    ///
    /// # エラー
    ///
    /// オフセットが単調非減少でない場合や、素性データの範囲を超える場合にエラーを返します。
    pub fn new(offsets: Array<i32>, data: Array<u16>) -> Result<Self> {
        let mut prev = 0;
        for (i, &o) in offsets.iter().enumerate() {
            if o < prev || usize::try_from(o).map_or(true, |o| o > data.len()) {
                return Err(WakachiError::invalid_format(
                    "word.inf",
                    format!("feature offset {o} of word {i} is out of order or out of range"),
                ));
            }
            prev = o;
        }
        Ok(Self { offsets, data })
    }

    /// 単語数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// 単語IDから素性のコード単位列を取得します。
    #[inline(always)]
    pub fn get(&self, word_id: usize) -> &[u16] {
        let beg = self.offsets[word_id] as usize;
        let end = self.offsets[word_id + 1] as usize;
        &self.data[beg..end]
    }
}
