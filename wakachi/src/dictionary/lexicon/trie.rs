//! ダブル配列トライによる表層形の検索
//!
//! このモジュールは、`word2id`ファイルに保存されたダブル配列トライを読み込み、
//! 完全一致検索と共通接頭辞検索を提供します。
//!
//! トライは`base`と`check`の2つの配列と、分岐のない末尾の文字列を格納する
//! `tail`配列から構成されます。`base`の値が負の場合、そのノードは葉であり、
//! `-base - 1`がエントリIDを表します。エントリIDに対応する残りの文字列は
//! `tail[begs[id]..begs[id] + lens[id]]`に格納されています。

use crate::dictionary::reader::{Array, ReadArray};
use crate::errors::{Result, WakachiError};
use crate::utils::to_count;

/// キーの終端を表す予約コード
pub const TERMINATE_CODE: u16 = 0;

/// 未使用のスロットを表す予約コード
pub const VACANT_CODE: u16 = 1;

const FILE_NAME: &str = "word2id";

/// 葉ノードの`base`値からエントリIDを復元します。
#[inline(always)]
const fn leaf_id(base: i32) -> u32 {
    // `base` is negative here, so the result fits in u32.
    (-(base as i64) - 1) as u32
}

/// ダブル配列トライの検索器
#[derive(Debug, Default)]
pub struct Searcher {
    begs: Array<i32>,
    base: Array<i32>,
    lens: Array<i16>,
    chck: Array<u16>,
    tail: Array<u16>,
}

impl Searcher {
    /// `word2id`ファイルからトライを読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - `word2id`ファイルのリーダー
    ///
    /// # エラー
    ///
    /// ヘッダーの件数が負である場合、ファイルが切り詰められている場合、
    /// または末尾文字列や葉のIDが範囲外を指している場合にエラーを返します。
    pub fn from_reader<R>(rdr: &mut R) -> Result<Self>
    where
        R: ReadArray,
    {
        let node_count = to_count(rdr.get_int()?, FILE_NAME, "nodeCount")?;
        let entry_count = to_count(rdr.get_int()?, FILE_NAME, "entryCount")?;
        let tail_size = to_count(rdr.get_int()?, FILE_NAME, "tailSize")?;
        if node_count == 0 {
            return Err(WakachiError::invalid_format(
                FILE_NAME,
                "nodeCount must be positive",
            ));
        }

        let searcher = Self {
            begs: rdr.get_int_array(entry_count)?,
            base: rdr.get_int_array(node_count)?,
            lens: rdr.get_short_array(entry_count)?,
            chck: rdr.get_char_array(node_count)?,
            tail: rdr.get_char_array(tail_size)?,
        };
        searcher.validate()?;

        log::debug!(
            "{}: {node_count} nodes, {entry_count} entries, {tail_size} tail units",
            rdr.name()
        );
        Ok(searcher)
    }

    fn validate(&self) -> Result<()> {
        for (id, (&beg, &len)) in self.begs.iter().zip(self.lens.iter()).enumerate() {
            let ok = beg >= 0
                && len >= 0
                && usize::try_from(i64::from(beg) + i64::from(len))
                    .is_ok_and(|end| end <= self.tail.len());
            if !ok {
                return Err(WakachiError::invalid_format(
                    FILE_NAME,
                    format!("tail range of entry {id} is out of bounds: {beg}+{len}"),
                ));
            }
        }
        for &b in self.base.iter() {
            if b < 0 && usize::try_from(leaf_id(b)).map_or(true, |id| id >= self.begs.len()) {
                return Err(WakachiError::invalid_format(
                    FILE_NAME,
                    format!("leaf id {} exceeds the entry count", leaf_id(b)),
                ));
            }
        }
        Ok(())
    }

    /// トライに格納されているキーの数を返します。
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.begs.len()
    }

    /// `node + code`の遷移先を返します。
    ///
    /// `check`が一致しない場合や範囲外の場合は`None`を返します。
    #[inline(always)]
    fn transition(&self, node: i32, code: u16) -> Option<i32> {
        let idx = usize::try_from(i64::from(node) + i64::from(code)).ok()?;
        if *self.chck.get(idx)? == code {
            Some(self.base[idx])
        } else {
            None
        }
    }

    /// エントリIDに対応する末尾の文字列を返します。
    #[inline(always)]
    fn tail_of(&self, id: u32) -> &[u16] {
        let id = id as usize;
        // Ranges were validated at load time.
        let beg = self.begs[id] as usize;
        let len = self.lens[id] as usize;
        &self.tail[beg..beg + len]
    }

    /// キーを完全一致で検索します。
    ///
    /// # 引数
    ///
    /// * `key` - 検索するキー（UTF-16のコード単位列）
    ///
    /// # 戻り値
    ///
    /// キーが存在する場合はそのエントリID、存在しない場合は`None`
    pub fn search(&self, key: &[u16]) -> Option<u32> {
        let mut node = self.base[0];
        let mut pos = 0;
        loop {
            let code = key.get(pos).copied().unwrap_or(TERMINATE_CODE);
            if pos < key.len() {
                pos += 1;
            }
            let next = self.transition(node, code)?;
            if next >= 0 {
                if code == TERMINATE_CODE {
                    return None;
                }
                node = next;
                continue;
            }
            let id = leaf_id(next);
            return (&key[pos..] == self.tail_of(id)).then_some(id);
        }
    }

    /// `text[start..]`の接頭辞となるすべてのキーを、短い順に列挙するイテレータを返します。
    ///
    /// # 引数
    ///
    /// * `text` - 検索対象のテキスト
    /// * `start` - 検索を開始する位置
    pub fn common_prefix_iterator<'a>(&'a self, text: &'a [u16], start: usize) -> CommonPrefixIter<'a> {
        CommonPrefixIter {
            searcher: self,
            text,
            start,
            node: self.base[0],
            offset: 0,
            terminal_checked: false,
            done: start > text.len(),
        }
    }
}

/// トライマッチング結果
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct TrieMatch {
    /// エントリID
    pub value: u32,
    /// 一致した長さ（コード単位）
    pub length: usize,
}

impl TrieMatch {
    /// 新しいマッチング結果を作成します。
    #[inline(always)]
    pub const fn new(value: u32, length: usize) -> Self {
        Self { value, length }
    }
}

/// 共通接頭辞検索のイテレータ
///
/// [`Searcher::common_prefix_iterator`]によって作成されます。
pub struct CommonPrefixIter<'a> {
    searcher: &'a Searcher,
    text: &'a [u16],
    start: usize,
    node: i32,
    offset: usize,
    terminal_checked: bool,
    done: bool,
}

impl Iterator for CommonPrefixIter<'_> {
    type Item = TrieMatch;

    fn next(&mut self) -> Option<TrieMatch> {
        let s = self.searcher;
        while !self.done {
            let pos = self.start + self.offset;
            let code = self.text.get(pos).copied().unwrap_or(TERMINATE_CODE);

            if !self.terminal_checked {
                self.terminal_checked = true;
                if let Some(b) = s.transition(self.node, TERMINATE_CODE) {
                    if code == TERMINATE_CODE {
                        self.done = true;
                    }
                    if b < 0 && self.offset != 0 {
                        return Some(TrieMatch::new(leaf_id(b), self.offset));
                    }
                    continue;
                }
            }
            self.terminal_checked = false;

            if code == TERMINATE_CODE {
                self.done = true;
                break;
            }
            let Some(next) = s.transition(self.node, code) else {
                self.done = true;
                break;
            };
            if next >= 0 {
                self.node = next;
                self.offset += 1;
                continue;
            }

            self.done = true;
            let id = leaf_id(next);
            let tail = s.tail_of(id);
            if self.text[pos + 1..].starts_with(tail) {
                return Some(TrieMatch::new(id, self.offset + tail.len() + 1));
            }
        }
        None
    }
}
