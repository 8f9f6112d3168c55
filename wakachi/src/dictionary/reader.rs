//! 辞書ファイルのバイナリリーダー
//!
//! 辞書ディレクトリ内の固定レイアウトのファイルを、型付きの配列として読み出します。
//! 読み込み戦略は2つあります。
//!
//! - [`StreamReader`]: ファイルを先頭から順に読み、必要に応じてバイト順序を変換して
//!   ヒープ上の配列にコピーします。
//! - [`MappedReader`]: ファイルを読み取り専用でメモリマップし、ゼロコピーのビューを返します。
//!   ホストのバイト順序と辞書のバイト順序が一致する場合にのみ使用されます。
//!
//! どちらも[`ReadArray`]トレイトを実装しており、[`DictReader`]がその選択を隠蔽します。
mod mapped;
pub(crate) mod stream;

use std::fmt;
use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::dictionary::config::{ByteOrder, LoadMode};
use crate::errors::{Result, WakachiError};

pub use crate::dictionary::reader::mapped::MappedReader;
pub use crate::dictionary::reader::stream::StreamReader;

mod private {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
}

/// 辞書ファイルに格納される固定幅の要素型。
///
/// 任意のビット列が有効な値となる整数型にのみ実装されています。
pub trait Element: private::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// 要素のバイト幅
    const SIZE: usize;

    /// `SIZE`バイトのスライスを指定のバイト順序で解釈します。
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self;
}

impl Element for i32 {
    const SIZE: usize = 4;

    #[inline(always)]
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
        let b = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match order {
            ByteOrder::Little => Self::from_le_bytes(b),
            ByteOrder::Big => Self::from_be_bytes(b),
        }
    }
}

impl Element for i16 {
    const SIZE: usize = 2;

    #[inline(always)]
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
        let b = [bytes[0], bytes[1]];
        match order {
            ByteOrder::Little => Self::from_le_bytes(b),
            ByteOrder::Big => Self::from_be_bytes(b),
        }
    }
}

impl Element for u16 {
    const SIZE: usize = 2;

    #[inline(always)]
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
        let b = [bytes[0], bytes[1]];
        match order {
            ByteOrder::Little => Self::from_le_bytes(b),
            ByteOrder::Big => Self::from_be_bytes(b),
        }
    }
}

/// バイト列を要素の配列へ変換します。
///
/// `bytes.len()`は`T::SIZE`の倍数でなければなりません。
pub(crate) fn decode_elements<T: Element>(bytes: &[u8], order: ByteOrder) -> Vec<T> {
    debug_assert_eq!(bytes.len() % T::SIZE, 0);
    bytes
        .chunks_exact(T::SIZE)
        .map(|c| T::from_bytes(c, order))
        .collect()
}

/// 辞書から読み込まれた読み取り専用の配列。
///
/// ヒープ上に所有された配列か、メモリマップされたファイルへのビューのどちらかです。
/// いずれの場合も[`Deref`]によってスライスとして扱えます。
/// マップされたビューはマッピングへの[`Arc`]を保持するため、
/// ビューが生きている間はマッピングも解放されません。
pub struct Array<T: Element> {
    repr: Repr<T>,
}

enum Repr<T> {
    Owned(Vec<T>),
    Mapped {
        map: Arc<Mmap>,
        offset: usize,
        len: usize,
        _marker: PhantomData<T>,
    },
}

impl<T: Element> Array<T> {
    /// マッピング上のビューを作成します。
    ///
    /// 範囲がマッピング内に収まり、かつ先頭アドレスが`T`の境界に揃っている場合に
    /// `Some`を返します。
    pub(crate) fn mapped(map: Arc<Mmap>, offset: usize, len: usize) -> Option<Self> {
        let nbytes = len.checked_mul(T::SIZE)?;
        if offset.checked_add(nbytes)? > map.len() {
            return None;
        }
        let addr = map.as_ptr() as usize + offset;
        if addr % std::mem::align_of::<T>() != 0 {
            return None;
        }
        Some(Self {
            repr: Repr::Mapped {
                map,
                offset,
                len,
                _marker: PhantomData,
            },
        })
    }

    /// メモリマップされたビューであれば`true`を返します。
    #[inline(always)]
    pub fn is_mapped(&self) -> bool {
        matches!(self.repr, Repr::Mapped { .. })
    }
}

impl<T: Element> From<Vec<T>> for Array<T> {
    fn from(v: Vec<T>) -> Self {
        Self {
            repr: Repr::Owned(v),
        }
    }
}

impl<T: Element> Default for Array<T> {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl<T: Element> Deref for Array<T> {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        match &self.repr {
            Repr::Owned(v) => v,
            Repr::Mapped {
                map, offset, len, ..
            } => {
                // SAFETY: `Array::mapped` checked that the range lies inside the mapping and
                // that the start is aligned for `T`. Every bit pattern is a valid `T`, and the
                // mapping is read-only and kept alive by the `Arc`.
                unsafe { std::slice::from_raw_parts(map.as_ptr().add(*offset).cast::<T>(), *len) }
            }
        }
    }
}

impl<T: Element> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("mapped", &self.is_mapped())
            .field("len", &self.len())
            .finish()
    }
}

/// 辞書ファイルから型付きの値を読み出す機能。
///
/// 読み出しは先頭から順に行われ、各呼び出しは内部のカーソルを進めます。
pub trait ReadArray {
    /// 読み込み中のファイル名を返します。
    fn name(&self) -> &str;

    /// ファイル全体のバイト数を返します。
    fn size(&self) -> usize;

    /// まだ読み出していないバイト数を返します。
    fn remaining(&self) -> usize;

    /// `count`個の要素を読み出します。
    ///
    /// # エラー
    ///
    /// 要求されたバイト数が残りのバイト数を超える場合、[`WakachiError::Truncated`]を返します。
    fn get_array<T: Element>(&mut self, count: usize) -> Result<Array<T>>;

    /// 32ビット整数を1つ読み出します。
    fn get_int(&mut self) -> Result<i32> {
        let a = self.get_array::<i32>(1)?;
        Ok(a[0])
    }

    /// `count`個の32ビット整数を読み出します。
    fn get_int_array(&mut self, count: usize) -> Result<Array<i32>> {
        self.get_array(count)
    }

    /// `count`個の16ビット符号付き整数を読み出します。
    fn get_short_array(&mut self, count: usize) -> Result<Array<i16>> {
        self.get_array(count)
    }

    /// `count`個の16ビットコード単位を読み出します。
    fn get_char_array(&mut self, count: usize) -> Result<Array<u16>> {
        self.get_array(count)
    }
}

/// 要求されたバイト数を計算し、残りのバイト数と照合します。
#[inline]
pub(crate) fn checked_request<T: Element>(
    name: &str,
    count: usize,
    remaining: usize,
) -> Result<usize> {
    match count.checked_mul(T::SIZE) {
        Some(n) if n <= remaining => Ok(n),
        Some(n) => Err(WakachiError::truncated(name, n, remaining)),
        None => Err(WakachiError::truncated(name, usize::MAX, remaining)),
    }
}

/// 読み込み戦略を隠蔽する辞書ファイルリーダー。
///
/// ファイルハンドルやマッピングは所有権によって管理され、エラー経路を含めて
/// リーダーがスコープを抜けた時点で解放されます（マップされた配列が生きている場合、
/// マッピング自体はそれらが解放されるまで保持されます）。
#[derive(Debug)]
pub enum DictReader {
    /// ストリーム読み込み
    Stream(StreamReader),
    /// メモリマップ
    Mapped(MappedReader),
}

impl DictReader {
    /// 辞書ファイルを開きます。
    ///
    /// # 引数
    ///
    /// * `path` - ファイルのパス
    /// * `order` - 辞書のバイト順序
    /// * `mode` - 読み込み戦略
    ///
    /// # エラー
    ///
    /// ファイルが存在しない場合は[`WakachiError::NotFound`]、
    /// その他の入出力エラーは[`WakachiError::Io`]を返します。
    pub fn open<P>(path: P, order: ByteOrder, mode: LoadMode) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = open_file(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = usize::try_from(file.metadata()?.len())?;

        let use_mmap = match mode {
            LoadMode::Stream => false,
            LoadMode::Auto => order.is_native(),
            LoadMode::Mmap => {
                if !order.is_native() {
                    log::warn!(
                        "{name}: byte order {order:?} differs from the host, falling back to streamed reads"
                    );
                }
                order.is_native()
            }
        };

        // Empty files cannot be mapped on every platform.
        if use_mmap && size != 0 {
            // SAFETY: The dictionary is an immutable artifact. Modifying the file while it is
            // mapped is outside the supported usage.
            let map = unsafe { Mmap::map(&file)? };
            log::debug!("{name}: mapped {size} bytes");
            Ok(Self::Mapped(MappedReader::new(name, Arc::new(map))))
        } else {
            log::debug!("{name}: streaming {size} bytes ({order:?})");
            Ok(Self::Stream(StreamReader::new(name, file, size, order)))
        }
    }

    /// メモリマップを使用していれば`true`を返します。
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl ReadArray for DictReader {
    fn name(&self) -> &str {
        match self {
            Self::Stream(r) => r.name(),
            Self::Mapped(r) => r.name(),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Stream(r) => r.size(),
            Self::Mapped(r) => r.size(),
        }
    }

    fn remaining(&self) -> usize {
        match self {
            Self::Stream(r) => r.remaining(),
            Self::Mapped(r) => r.remaining(),
        }
    }

    fn get_array<T: Element>(&mut self, count: usize) -> Result<Array<T>> {
        match self {
            Self::Stream(r) => r.get_array(count),
            Self::Mapped(r) => r.get_array(count),
        }
    }
}

/// ファイルを開き、存在しない場合は[`WakachiError::NotFound`]に変換します。
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            WakachiError::NotFound(path.to_path_buf())
        } else {
            WakachiError::Io(e)
        }
    })
}
