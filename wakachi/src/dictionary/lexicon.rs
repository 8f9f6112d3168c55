//! 辞書の語彙情報を管理するモジュール
//!
//! このモジュールは、単語の表層形、パラメータ、素性情報を管理する
//! 語彙データ構造を提供します。以下のファイルから構築されます。
//!
//! - `word2id`: 表層形のダブル配列トライ
//! - `word.dat`（または`word.dat.*`）: 連結された素性文字列
//! - `word.ary.idx`: エントリIDから単語IDの範囲への配列
//! - `word.inf`: 単語ごとの素性オフセット、文脈ID、コスト

mod feature;
mod map;
mod param;
pub mod trie;

use std::fs;
use std::path::{Path, PathBuf};

use crate::dictionary::config::DictionaryOptions;
use crate::dictionary::connector::ConnectorView;
use crate::dictionary::lexicon::feature::WordFeatures;
use crate::dictionary::lexicon::map::WordMap;
use crate::dictionary::lexicon::param::WordParams;
use crate::dictionary::lexicon::trie::Searcher;
use crate::dictionary::reader::{stream, Array, DictReader, ReadArray};
use crate::errors::{Result, WakachiError};

pub use crate::dictionary::lexicon::param::WordParam;

/// `word.inf`の1単語あたりのバイト数（オフセット、左ID、右ID、コスト）
const WORD_INFO_SIZE: usize = 4 + 2 + 2 + 2;

/// 単語の語彙情報
#[derive(Debug)]
pub struct Lexicon {
    map: WordMap,
    params: WordParams,
    features: WordFeatures,
}

impl Lexicon {
    /// 辞書ディレクトリから語彙情報を読み込みます。
    ///
    /// # 引数
    ///
    /// * `dir` - 辞書ディレクトリ
    /// * `options` - 読み込みオプション
    ///
    /// # エラー
    ///
    /// ファイルが存在しない場合、切り詰められている場合、
    /// または内容が互いに矛盾している場合にエラーを返します。
    pub fn from_dir(dir: &Path, options: &DictionaryOptions) -> Result<Self> {
        let order = options.get_byte_order();
        let mode = options.get_load_mode();

        let trie = {
            let mut rdr = DictReader::open(dir.join("word2id"), order, mode)?;
            Searcher::from_reader(&mut rdr)?
        };

        let data = match split_parts(dir, options.get_split_data())? {
            Some(parts) => Array::from(stream::read_concatenated_chars(&parts, order)?),
            None => {
                let mut rdr = DictReader::open(dir.join("word.dat"), order, mode)?;
                let n = whole_elements(&rdr, 2, "word.dat")?;
                rdr.get_char_array(n)?
            }
        };

        let indices = {
            let mut rdr = DictReader::open(dir.join("word.ary.idx"), order, mode)?;
            let n = whole_elements(&rdr, 4, "word.ary.idx")?;
            rdr.get_int_array(n)?
        };

        let (offsets, params) = {
            let mut rdr = DictReader::open(dir.join("word.inf"), order, mode)?;
            let n = whole_elements(&rdr, WORD_INFO_SIZE, "word.inf")?;
            if n == 0 {
                return Err(WakachiError::invalid_format(
                    "word.inf",
                    "the sentinel entry is missing",
                ));
            }
            let offsets = rdr.get_int_array(n)?;
            let params = WordParams::from_reader(&mut rdr, n)?;
            (offsets, params)
        };

        let features = WordFeatures::new(offsets, data)?;
        let map = WordMap::new(trie, indices, features.len())?;
        log::debug!(
            "lexicon: {} entries, {} words",
            map.trie().size(),
            features.len()
        );

        Ok(Self {
            map,
            params,
            features,
        })
    }

    /// 入力テキストの`start`からの共通接頭辞に一致する単語を返すイテレータを取得します。
    ///
    /// 一致長の短い順に列挙します。
    #[inline(always)]
    pub fn common_prefix_iterator<'a>(
        &'a self,
        text: &'a [u16],
        start: usize,
    ) -> impl Iterator<Item = LexMatch> + 'a {
        self.map
            .common_prefix_iterator(text, start)
            .map(move |(word_id, length)| {
                LexMatch::new(word_id, self.params.get(word_id as usize), length)
            })
    }

    /// エントリIDが所有するすべての単語を、指定した長さの候補として返します。
    ///
    /// 未知語処理で、文字カテゴリに予約されたエントリを再利用するために使用します。
    #[inline(always)]
    pub fn entry_iterator(&self, entry_id: u32, length: usize) -> impl Iterator<Item = LexMatch> + '_ {
        self.map
            .ids(entry_id)
            .map(move |word_id| LexMatch::new(word_id, self.params.get(word_id as usize), length))
    }

    /// 表層形を完全一致で検索し、エントリIDを返します。
    #[inline(always)]
    pub fn search(&self, key: &[u16]) -> Option<u32> {
        self.map.trie().search(key)
    }

    /// エントリIDが所有する単語の数を返します。
    #[inline(always)]
    pub fn num_entry_words(&self, entry_id: u32) -> usize {
        self.map.ids(entry_id).len()
    }

    /// トライのエントリ数を返します。
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.map.trie().size()
    }

    /// 単語数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.features.len()
    }

    /// 単語のパラメータを取得します。
    #[inline(always)]
    pub fn word_param(&self, word_id: u32) -> WordParam {
        self.params.get(word_id as usize)
    }

    /// 単語の素性をコード単位列として取得します。
    #[inline(always)]
    pub fn word_feature(&self, word_id: u32) -> &[u16] {
        self.features.get(word_id as usize)
    }

    /// 左右IDがコネクターで有効かどうかをチェックします。
    ///
    /// # エラー
    ///
    /// 接続表の範囲外の文脈IDを持つ単語がある場合にエラーを返します。
    pub fn verify<C>(&self, conn: &C) -> Result<()>
    where
        C: ConnectorView,
    {
        debug_assert!(self.params.len() > self.num_words());
        for word_id in 0..self.num_words() {
            let p = self.params.get(word_id);
            if conn.num_left() <= usize::from(p.left_id) || conn.num_right() <= usize::from(p.right_id) {
                return Err(WakachiError::invalid_format(
                    "word.inf",
                    format!(
                        "context ids ({}, {}) of word {word_id} exceed the matrix size ({}, {})",
                        p.left_id,
                        p.right_id,
                        conn.num_left(),
                        conn.num_right()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// 語彙の検索結果
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct LexMatch {
    pub word_id: u32,
    pub word_param: WordParam,
    /// 一致長（コード単位）
    pub length: usize,
}

impl LexMatch {
    #[inline(always)]
    pub const fn new(word_id: u32, word_param: WordParam, length: usize) -> Self {
        Self {
            word_id,
            word_param,
            length,
        }
    }
}

/// ファイルサイズが要素幅の倍数であることを確認し、要素数を返します。
fn whole_elements(rdr: &DictReader, width: usize, file: &'static str) -> Result<usize> {
    let size = rdr.size();
    if size % width != 0 {
        return Err(WakachiError::invalid_format(
            file,
            format!("file size {size} is not a multiple of {width}"),
        ));
    }
    Ok(size / width)
}

/// 分割された素性ファイルの一覧を返します。
///
/// 分割されていない場合は`None`を返します。
fn split_parts(dir: &Path, split: Option<bool>) -> Result<Option<Vec<PathBuf>>> {
    let split = match split {
        Some(split) => split,
        None => !dir.join("word.dat").exists(),
    };
    if !split {
        return Ok(None);
    }

    let mut parts = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(suffix) = name.strip_prefix("word.dat.") else {
            continue;
        };
        let (num, suffix) = (suffix.parse::<u64>().ok(), suffix.to_string());
        parts.push((num, suffix, path));
    }
    if parts.is_empty() {
        return Err(WakachiError::NotFound(dir.join("word.dat")));
    }
    // Numeric suffixes first in numeric order, then the rest by name.
    parts.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });
    Ok(Some(parts.into_iter().map(|p| p.2).collect()))
}
