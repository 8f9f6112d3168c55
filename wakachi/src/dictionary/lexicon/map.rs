//! 表層形から単語IDへのマッピング
//!
//! トライのエントリIDと、そのエントリが所有する単語IDの範囲を対応付けます。

use std::ops::Range;

use crate::dictionary::lexicon::trie::Searcher;
use crate::dictionary::reader::Array;
use crate::errors::{Result, WakachiError};

/// 表層形をトライで管理し、エントリごとの単語ID範囲を保持するマップ
#[derive(Debug)]
pub struct WordMap {
    trie: Searcher,
    indices: Array<i32>,
}

impl WordMap {
    /// トライと`word.ary.idx`の内容から新しいインスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `trie` - 表層形のトライ
    /// * `indices` - エントリIDから先頭の単語IDへの配列（末尾に番兵を含む）
    /// * `num_words` - 単語の総数
    ///
    /// # エラー
    ///
    /// 配列の長さがエントリ数と一致しない場合、値が単調非減少でない場合、
    /// または単語数を超える値を含む場合にエラーを返します。
    pub fn new(trie: Searcher, indices: Array<i32>, num_words: usize) -> Result<Self> {
        if indices.len() != trie.size() + 1 {
            return Err(WakachiError::invalid_format(
                "word.ary.idx",
                format!(
                    "expected {} entries, found {}",
                    trie.size() + 1,
                    indices.len()
                ),
            ));
        }
        let mut prev = 0;
        for (e, &idx) in indices.iter().enumerate() {
            if idx < prev || usize::try_from(idx).map_or(true, |i| i > num_words) {
                return Err(WakachiError::invalid_format(
                    "word.ary.idx",
                    format!("word index {idx} of entry {e} is out of order or out of range"),
                ));
            }
            prev = idx;
        }
        Ok(Self { trie, indices })
    }

    /// トライを返します。
    #[inline(always)]
    pub fn trie(&self) -> &Searcher {
        &self.trie
    }

    /// エントリIDが所有する単語IDの範囲を返します。
    #[inline(always)]
    pub fn ids(&self, entry_id: u32) -> Range<u32> {
        let e = entry_id as usize;
        // Validated to be non-negative and non-decreasing.
        self.indices[e] as u32..self.indices[e + 1] as u32
    }

    /// `text[start..]`の接頭辞に一致する単語IDと一致長を返すイテレータを取得します。
    ///
    /// 一致長の昇順、同じ長さの中では単語IDの昇順に列挙します。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        text: &'a [u16],
        start: usize,
    ) -> impl Iterator<Item = (u32, usize)> + 'a {
        self.trie
            .common_prefix_iterator(text, start)
            .flat_map(move |m| self.ids(m.value).map(move |word_id| (word_id, m.length)))
    }
}
