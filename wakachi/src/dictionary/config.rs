//! 辞書読み込みの設定
//!
//! このモジュールは、辞書ディレクトリを読み込む際のバイト順序、
//! 読み込み戦略、分割された素性ファイルの扱いなどの設定を定義します。

use std::env;
use std::path::PathBuf;

/// 既定の辞書ディレクトリを上書きする環境変数の名前。
pub const DICDIR_ENV: &str = "WAKACHI_DICDIR";

/// 辞書ファイルのバイト順序。
///
/// 1つの辞書ビルドに含まれる整数・短整数・文字データは、すべて同じバイト順序で
/// 書き込まれています。ファイルごとに異なる順序を指定することはできません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// リトルエンディアン
    Little,
    /// ビッグエンディアン
    Big,
}

impl ByteOrder {
    /// 実行中のホストのバイト順序を返します。
    #[inline(always)]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// ホストのバイト順序と一致するかどうかを返します。
    #[inline(always)]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

/// 辞書ファイルの読み込み戦略。
///
/// | モード | ホストと同じバイト順序 | 異なるバイト順序 |
/// |------|--------------|------------|
/// | `Auto` | メモリマップ | ストリーム読み込み |
/// | `Mmap` | メモリマップ | ストリーム読み込み（警告を出力） |
/// | `Stream` | ストリーム読み込み | ストリーム読み込み |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// 可能であればメモリマップを使用します。
    #[default]
    Auto,
    /// メモリマップを要求します。
    ///
    /// バイト順序の変換が必要な場合はゼロコピーで提供できないため、
    /// ストリーム読み込みにフォールバックします。
    Mmap,
    /// 常にファイルを読み込んでヒープ上の配列にコピーします。
    Stream,
}

/// 辞書ディレクトリの読み込みオプション。
///
/// # 例
///
/// ```
/// use wakachi::dictionary::{ByteOrder, DictionaryOptions, LoadMode};
///
/// let options = DictionaryOptions::new()
///     .byte_order(ByteOrder::Big)
///     .load_mode(LoadMode::Stream);
/// assert_eq!(options.get_byte_order(), ByteOrder::Big);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DictionaryOptions {
    byte_order: ByteOrder,
    load_mode: LoadMode,
    split_data: Option<bool>,
}

impl DictionaryOptions {
    /// 既定のオプションを作成します。
    ///
    /// バイト順序はホストと同じ、読み込み戦略は[`LoadMode::Auto`]、
    /// 素性ファイルの分割は自動判定です。
    pub fn new() -> Self {
        Self::default()
    }

    /// 辞書のバイト順序を指定します。
    pub const fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// 読み込み戦略を指定します。
    pub const fn load_mode(mut self, load_mode: LoadMode) -> Self {
        self.load_mode = load_mode;
        self
    }

    /// 素性データが`word.dat.*`に分割されているかどうかを指定します。
    ///
    /// `None`の場合、`word.dat`が存在しなければ分割ファイルを探します。
    pub const fn split_data(mut self, split_data: Option<bool>) -> Self {
        self.split_data = split_data;
        self
    }

    /// 指定されたバイト順序を返します。
    pub const fn get_byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// 指定された読み込み戦略を返します。
    pub const fn get_load_mode(&self) -> LoadMode {
        self.load_mode
    }

    /// 素性ファイルの分割指定を返します。
    pub const fn get_split_data(&self) -> Option<bool> {
        self.split_data
    }
}

/// 既定の辞書ディレクトリを返します。
///
/// 環境変数`WAKACHI_DICDIR`が設定されていればその値を、そうでなければ
/// ユーザー固有のローカルデータディレクトリ内の`wakachi/ipadic`を返します。
///
/// | プラットフォーム | 例 |
/// | -------- | ------------------------------------- |
/// | Linux    | `/home/alice/.local/share/wakachi/ipadic` |
/// | macOS    | `/Users/Alice/Library/Application Support/wakachi/ipadic` |
/// | Windows  | `C:\Users\Alice\AppData\Local\wakachi\ipadic` |
pub fn default_dictionary_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os(DICDIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    Some(dirs::data_local_dir()?.join("wakachi").join("ipadic"))
}
