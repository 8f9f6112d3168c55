//! 未知語処理モジュール
//!
//! このモジュールは、辞書に登録されていない文字列に対して、
//! 文字カテゴリに基づいて未知語の候補を生成する機能を提供します。

use crate::dictionary::character::{CharCategory, SPACE_CODE};
use crate::errors::{Result, WakachiError};
use crate::sentence::Sentence;

/// 未知語候補の範囲
///
/// 候補は文字カテゴリに予約されたトライのエントリを参照し、
/// そのエントリが所有する各単語がラティスのノードになります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnkWord {
    start: usize,
    end: usize,
    entry_id: u32,
    is_space: bool,
}

impl UnkWord {
    /// 開始位置（コード単位）を返します。
    #[inline(always)]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// 終了位置（コード単位）を返します。
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// カテゴリに予約されたエントリIDを返します。
    #[inline(always)]
    pub const fn entry_id(&self) -> u32 {
        self.entry_id
    }

    /// 空白カテゴリの候補であれば`true`を返します。
    #[inline(always)]
    pub const fn is_space(&self) -> bool {
        self.is_space
    }
}

/// 未知語ハンドラー
#[derive(Debug, Clone, Copy)]
pub struct UnkHandler {
    space_id: u32,
}

impl UnkHandler {
    /// 文字カテゴリ表から未知語ハンドラーを作成します。
    ///
    /// 空白カテゴリは、コード単位`0x20`が属するカテゴリとして決定されます。
    pub fn new(char_cat: &CharCategory) -> Self {
        Self {
            space_id: char_cat.category(SPACE_CODE).id,
        }
    }

    /// 空白カテゴリのエントリIDを返します。
    #[inline(always)]
    pub const fn space_id(&self) -> u32 {
        self.space_id
    }

    /// すべてのカテゴリのエントリが語彙に存在し、少なくとも1つの単語を持つことを確認します。
    pub fn verify<F>(&self, char_cat: &CharCategory, num_entry_words: F) -> Result<()>
    where
        F: Fn(u32) -> Option<usize>,
    {
        for (i, cat) in char_cat.categories().iter().enumerate() {
            match num_entry_words(cat.id) {
                Some(n) if n > 0 => {}
                Some(_) => {
                    return Err(WakachiError::invalid_format(
                        "char.category",
                        format!("the entry {} of category {i} owns no word", cat.id),
                    ))
                }
                None => {
                    return Err(WakachiError::invalid_format(
                        "char.category",
                        format!("category {i} refers to the missing entry {}", cat.id),
                    ))
                }
            }
        }
        Ok(())
    }

    /// 位置`start`から始まる未知語候補を短い順に生成します。
    ///
    /// # 引数
    ///
    /// * `sent` - 入力文
    /// * `start` - 開始位置（コード単位）
    /// * `has_matched` - 同じ位置で既知語が見つかっているかどうか
    /// * `max_grouping_len` - グループ化された候補の最大長。`None`の場合は無制限
    /// * `char_cat` - 文字カテゴリ表
    /// * `f` - 候補ごとに呼び出されるコールバック
    pub fn gen_unk_words<F>(
        &self,
        sent: &Sentence,
        start: usize,
        has_matched: bool,
        max_grouping_len: Option<usize>,
        char_cat: &CharCategory,
        mut f: F,
    ) where
        F: FnMut(UnkWord),
    {
        let len = sent.len_unit();
        debug_assert!(start < len);

        let cinfo = sent.char_info(start);
        let ct = char_cat.category_of(cinfo);
        if has_matched && !ct.invoke {
            return;
        }

        let mut emit = |end: usize| {
            f(UnkWord {
                start,
                end,
                entry_id: ct.id,
                is_space: ct.id == self.space_id,
            })
        };

        let limit = len.min(start.saturating_add(ct.length));
        for i in start + 1..limit {
            emit(i);
            if !cinfo.is_compatible(&sent.char_info(i)) {
                return;
            }
        }
        if limit > start {
            emit(limit);
        }

        if ct.group && limit < len {
            let mut end = limit;
            while end < len && cinfo.is_compatible(&sent.char_info(end)) {
                end += 1;
            }
            if end > limit && max_grouping_len.map_or(true, |max| end - start <= max) {
                emit(end);
            }
        }
    }
}
