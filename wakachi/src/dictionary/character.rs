//! 文字カテゴリ定義
//!
//! このモジュールは、`char.category`と`code2category`から読み込まれる文字カテゴリを管理します。
//! 各コード単位は1つのカテゴリに分類され、カテゴリは未知語候補の最大長、
//! 未知語処理の起動、同種文字のグループ化を制御します。
//!
//! 2つのコード単位の互換性は、コード単位ごとのビットマスクが共通のビットを持つかどうかで判定します。

use std::fmt;

use crate::dictionary::config::DictionaryOptions;
use crate::dictionary::reader::{Array, DictReader, ReadArray};
use crate::errors::{Result, WakachiError};
use crate::utils::to_count;

/// `code2category`が覆うコード単位の数
pub const NUM_CODE_UNITS: usize = 0x10000;

/// 空白カテゴリを識別するために予約されたコード単位
pub const SPACE_CODE: u16 = 0x20;

/// 文字カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// カテゴリに予約されたトライのエントリID
    pub id: u32,
    /// 未知語候補の最大長（コード単位）
    pub length: usize,
    /// 既知語がある位置でも未知語処理を起動するかどうか
    pub invoke: bool,
    /// 互換な文字の連続を1つの候補にまとめるかどうか
    pub group: bool,
}

/// コード単位ごとの文字情報
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    cate_idx: u32,
    mask: u32,
}

impl fmt::Debug for CharInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharInfo")
            .field("cate_idx", &self.cate_idx)
            .field("mask", &format_args!("{:#x}", self.mask))
            .finish()
    }
}

impl CharInfo {
    /// カテゴリの添字を返します。
    #[inline(always)]
    pub const fn cate_idx(&self) -> u32 {
        self.cate_idx
    }

    /// 互換性判定用のビットマスクを返します。
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        self.mask
    }

    /// 2つの文字が互換であるかどうかを返します。
    #[inline(always)]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        self.mask & other.mask != 0
    }
}

/// 文字カテゴリ表
pub struct CharCategory {
    categories: Vec<Category>,
    char2id: Array<i32>,
    eql_masks: Array<i32>,
}

impl fmt::Debug for CharCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharCategory")
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

impl CharCategory {
    /// 辞書ディレクトリから文字カテゴリ表を読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルが存在しない場合、`code2category`がすべてのコード単位を覆っていない場合、
    /// または存在しないカテゴリを参照している場合にエラーを返します。
    pub fn from_dir(dir: &std::path::Path, options: &DictionaryOptions) -> Result<Self> {
        let order = options.get_byte_order();
        let mode = options.get_load_mode();

        let categories = {
            let mut rdr = DictReader::open(dir.join("char.category"), order, mode)?;
            if rdr.size() % 16 != 0 {
                return Err(WakachiError::invalid_format(
                    "char.category",
                    format!("file size {} is not a multiple of 16", rdr.size()),
                ));
            }
            let data = rdr.get_int_array(rdr.size() / 4)?;
            Self::convert_categories(&data)?
        };

        let (char2id, eql_masks) = {
            let mut rdr = DictReader::open(dir.join("code2category"), order, mode)?;
            let expected = NUM_CODE_UNITS * 4 * 2;
            if rdr.size() != expected {
                return Err(WakachiError::invalid_format(
                    "code2category",
                    format!("expected {expected} bytes, found {}", rdr.size()),
                ));
            }
            let char2id = rdr.get_int_array(NUM_CODE_UNITS)?;
            let eql_masks = rdr.get_int_array(NUM_CODE_UNITS)?;
            (char2id, eql_masks)
        };

        Self::new(categories, char2id, eql_masks)
    }

    /// 読み込んだ配列から新しいインスタンスを作成します。
    pub(crate) fn new(
        categories: Vec<Category>,
        char2id: Array<i32>,
        eql_masks: Array<i32>,
    ) -> Result<Self> {
        if categories.is_empty() {
            return Err(WakachiError::invalid_format(
                "char.category",
                "at least one category is required",
            ));
        }
        if char2id.len() != NUM_CODE_UNITS || eql_masks.len() != NUM_CODE_UNITS {
            return Err(WakachiError::invalid_format(
                "code2category",
                "the tables must cover all 65536 code units",
            ));
        }
        if let Some((code, &c)) = char2id
            .iter()
            .enumerate()
            .find(|(_, c)| usize::try_from(**c).map_or(true, |c| c >= categories.len()))
        {
            return Err(WakachiError::invalid_format(
                "code2category",
                format!(
                    "code {code:#06x} refers to category {c}, but only {} exist",
                    categories.len()
                ),
            ));
        }
        log::debug!("char category: {} categories", categories.len());
        Ok(Self {
            categories,
            char2id,
            eql_masks,
        })
    }

    fn convert_categories(data: &[i32]) -> Result<Vec<Category>> {
        data.chunks_exact(4)
            .map(|d| {
                Ok(Category {
                    id: u32::try_from(to_count(d[0], "char.category", "category id")?)?,
                    length: to_count(d[1], "char.category", "maxReach")?,
                    invoke: d[2] == 1,
                    group: d[3] == 1,
                })
            })
            .collect()
    }

    /// 定義されているカテゴリの一覧を返します。
    #[inline(always)]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// コード単位の文字情報を返します。
    #[inline(always)]
    pub fn char_info(&self, code: u16) -> CharInfo {
        let code = usize::from(code);
        // Both tables cover all code units and every category index was validated.
        CharInfo {
            cate_idx: self.char2id[code] as u32,
            mask: self.eql_masks[code] as u32,
        }
    }

    /// 文字情報に対応するカテゴリを返します。
    #[inline(always)]
    pub fn category_of(&self, info: CharInfo) -> &Category {
        &self.categories[info.cate_idx as usize]
    }

    /// コード単位のカテゴリを返します。
    #[inline(always)]
    pub fn category(&self, code: u16) -> &Category {
        self.category_of(self.char_info(code))
    }

    /// 2つのコード単位が互換であるかどうかを返します。
    #[inline(always)]
    pub fn is_compatible(&self, code1: u16, code2: u16) -> bool {
        self.char_info(code1).is_compatible(&self.char_info(code2))
    }
}
