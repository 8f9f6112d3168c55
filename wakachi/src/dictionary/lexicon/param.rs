//! 単語のパラメータ情報
//!
//! このモジュールは、単語の接続IDとコストなどのパラメータを管理します。

use crate::dictionary::reader::{Array, ReadArray};
use crate::errors::{Result, WakachiError};

/// 単語のパラメータ（接続IDとコスト）
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct WordParam {
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i16,
}

impl WordParam {
    /// 新しい単語パラメータを作成します。
    #[inline(always)]
    pub const fn new(left_id: u16, right_id: u16, word_cost: i16) -> Self {
        Self {
            left_id,
            right_id,
            word_cost,
        }
    }
}

/// 単語パラメータのコレクション
///
/// `word.inf`の左文脈ID、右文脈ID、コストの3つの並列配列を保持します。
#[derive(Debug)]
pub struct WordParams {
    left_ids: Array<i16>,
    right_ids: Array<i16>,
    costs: Array<i16>,
}

impl WordParams {
    /// `word.inf`の残りの部分から`count`件のパラメータを読み込みます。
    pub fn from_reader<R>(rdr: &mut R, count: usize) -> Result<Self>
    where
        R: ReadArray,
    {
        let left_ids = rdr.get_short_array(count)?;
        let right_ids = rdr.get_short_array(count)?;
        let costs = rdr.get_short_array(count)?;
        if let Some(i) = left_ids
            .iter()
            .chain(right_ids.iter())
            .position(|&id| id < 0)
        {
            return Err(WakachiError::invalid_format(
                "word.inf",
                format!("negative context id at position {i}"),
            ));
        }
        Ok(Self {
            left_ids,
            right_ids,
            costs,
        })
    }

    /// 単語IDからパラメータを取得します。
    #[inline(always)]
    pub fn get(&self, word_id: usize) -> WordParam {
        // Context ids were checked to be non-negative.
        WordParam::new(
            self.left_ids[word_id] as u16,
            self.right_ids[word_id] as u16,
            self.costs[word_id],
        )
    }

    /// パラメータの数を取得します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.costs.len()
    }
}
