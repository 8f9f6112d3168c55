//! トークン化のための辞書モジュール。
//!
//! このモジュールは、形態素解析に必要なバイナリ辞書ディレクトリの読み込みと管理を行います。
//! 辞書ディレクトリには以下のファイルが含まれます。
//!
//! | ファイル | 内容 |
//! |---------|------|
//! | `word2id` | 表層形のダブル配列トライ |
//! | `word.dat` / `word.dat.*` | 素性文字列（UTF-16） |
//! | `word.ary.idx` | エントリIDから単語IDの範囲 |
//! | `word.inf` | 単語ごとの素性オフセット、文脈ID、コスト |
//! | `matrix.bin` | 連接コスト表 |
//! | `char.category` | 文字カテゴリの定義 |
//! | `code2category` | コード単位ごとのカテゴリと互換マスク |
//!
//! すべての整数は1つのバイト順序で書き込まれています。
//! 読み込み時にすべてのファイルの整合性を検証し、不整合があれば解析を始める前にエラーを返します。
//!
//! # 辞書の読み込み方法
//!
//! - [`Dictionary::from_dir`]: ディレクトリとオプションを指定して読み込む
//! - [`Dictionary::from_default_dir`]: [`default_dictionary_dir`]から読み込む
pub(crate) mod character;
pub mod config;
pub(crate) mod connector;
pub(crate) mod lexicon;
pub mod reader;
pub(crate) mod unknown;

use std::path::Path;

use crate::dictionary::character::CharCategory;
use crate::dictionary::connector::MatrixConnector;
use crate::dictionary::lexicon::Lexicon;
use crate::dictionary::reader::DictReader;
use crate::dictionary::unknown::UnkHandler;
use crate::errors::{Result, WakachiError};

pub use crate::dictionary::config::{
    default_dictionary_dir, ByteOrder, DictionaryOptions, LoadMode, DICDIR_ENV,
};

pub(crate) use crate::dictionary::lexicon::WordParam;

/// トークン化のための読み取り専用辞書。
///
/// 一度読み込まれた辞書は変更されないため、[`Arc`](std::sync::Arc)で包んで
/// 複数のスレッドから同時に参照できます。メモリマップされたファイルは、
/// 辞書とそこから切り出された配列がすべて解放された時点で解放されます。
#[derive(Debug)]
pub struct Dictionary {
    lexicon: Lexicon,
    connector: MatrixConnector,
    char_cat: CharCategory,
    unk_handler: UnkHandler,
}

impl Dictionary {
    /// 辞書ディレクトリから辞書を読み込みます。
    ///
    /// # 引数
    ///
    /// * `dir` - 辞書ディレクトリのパス
    /// * `options` - 読み込みオプション
    ///
    /// # エラー
    ///
    /// 以下の場合にエラーを返します。
    ///
    /// - ディレクトリまたはファイルが存在しない場合 ([`WakachiError::NotFound`])
    /// - ファイルが宣言された件数より短い場合 ([`WakachiError::Truncated`])
    /// - ファイルの内容が互いに矛盾している場合 ([`WakachiError::InvalidFormat`])
    ///
    /// # 例
    ///
    /// ```no_run
    /// use wakachi::dictionary::{ByteOrder, DictionaryOptions};
    /// use wakachi::Dictionary;
    ///
    /// let options = DictionaryOptions::new().byte_order(ByteOrder::Big);
    /// let dict = Dictionary::from_dir("path/to/ipadic", options)?;
    /// # Ok::<(), wakachi::errors::WakachiError>(())
    /// ```
    pub fn from_dir<P>(dir: P, options: DictionaryOptions) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(WakachiError::NotFound(dir.to_path_buf()));
        }
        log::debug!(
            "loading dictionary from {} ({:?}, {:?})",
            dir.display(),
            options.get_byte_order(),
            options.get_load_mode()
        );

        let lexicon = Lexicon::from_dir(dir, &options)?;
        let connector = {
            let mut rdr = DictReader::open(
                dir.join("matrix.bin"),
                options.get_byte_order(),
                options.get_load_mode(),
            )?;
            MatrixConnector::from_reader(&mut rdr)?
        };
        let char_cat = CharCategory::from_dir(dir, &options)?;
        let unk_handler = UnkHandler::new(&char_cat);

        lexicon.verify(&connector)?;
        unk_handler.verify(&char_cat, |entry_id| {
            ((entry_id as usize) < lexicon.num_entries())
                .then(|| lexicon.num_entry_words(entry_id))
        })?;

        Ok(Self {
            lexicon,
            connector,
            char_cat,
            unk_handler,
        })
    }

    /// 既定の辞書ディレクトリから、既定のオプションで辞書を読み込みます。
    ///
    /// # エラー
    ///
    /// 既定のディレクトリを決定できない場合は[`WakachiError::InvalidArgument`]を返します。
    /// その他のエラーは[`Dictionary::from_dir`]と同じです。
    pub fn from_default_dir() -> Result<Self> {
        let dir = default_dictionary_dir().ok_or_else(|| {
            WakachiError::invalid_argument(
                "dir",
                "could not determine the default dictionary directory",
            )
        })?;
        Self::from_dir(dir, DictionaryOptions::default())
    }

    /// 語彙への参照を取得します。
    #[inline(always)]
    pub(crate) const fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// コネクタへの参照を取得します。
    #[inline(always)]
    pub(crate) const fn connector(&self) -> &MatrixConnector {
        &self.connector
    }

    /// 文字カテゴリ表への参照を取得します。
    #[inline(always)]
    pub(crate) const fn char_category(&self) -> &CharCategory {
        &self.char_cat
    }

    /// 未知語ハンドラへの参照を取得します。
    #[inline(always)]
    pub(crate) const fn unk_handler(&self) -> &UnkHandler {
        &self.unk_handler
    }

    /// 単語数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.lexicon.num_words()
    }

    /// 表層形が辞書に登録されていれば、そのトライのエントリIDを返します。
    ///
    /// # 例
    ///
    /// ```no_run
    /// use wakachi::Dictionary;
    ///
    /// let dict = Dictionary::from_default_dir()?;
    /// assert!(dict.lookup("世界").is_some());
    /// # Ok::<(), wakachi::errors::WakachiError>(())
    /// ```
    pub fn lookup(&self, surface: &str) -> Option<u32> {
        let key: Vec<u16> = surface.encode_utf16().collect();
        self.lexicon.search(&key)
    }

    /// 単語の素性文字列を取得します。
    ///
    /// 素性データはUTF-16で格納されているため、デコードした文字列を返します。
    /// 不正なサロゲートは置換文字に置き換えられます。
    ///
    /// # Panics
    ///
    /// `word_id`が単語数以上の場合にパニックします。
    #[inline]
    pub fn word_feature(&self, word_id: u32) -> String {
        String::from_utf16_lossy(self.lexicon.word_feature(word_id))
    }

    /// 単語の素性文字列を、置換文字を使わずに取得します。
    ///
    /// # エラー
    ///
    /// 素性データに対になっていないサロゲートが含まれる場合、[`WakachiError::Utf16`]を返します。
    ///
    /// # Panics
    ///
    /// `word_id`が単語数以上の場合にパニックします。
    pub fn try_word_feature(&self, word_id: u32) -> Result<String> {
        Ok(String::from_utf16(self.lexicon.word_feature(word_id))?)
    }

    /// 単語のパラメータを取得します。
    #[inline(always)]
    pub(crate) fn word_param(&self, word_id: u32) -> WordParam {
        self.lexicon.word_param(word_id)
    }
}
