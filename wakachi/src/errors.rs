//! エラー型の定義
//!
//! このモジュールは、Wakachiライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};
use std::path::PathBuf;

/// Wakachi専用のResult型
///
/// エラー型としてデフォルトで[`WakachiError`]を使用します。
pub type Result<T, E = WakachiError> = std::result::Result<T, E>;

/// Wakachiのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 辞書の読み込み時に発生するエラーは、解析を始める前にすべて報告されます。
#[derive(Debug, thiserror::Error)]
pub enum WakachiError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// 辞書ファイルの内容が宣言された件数や値域と矛盾している場合に発生します。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な状態エラー
    ///
    /// 内部不変条件の違反を表します。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 辞書ファイルが見つからないエラー
    #[error("The dictionary file '{0}' was not found.")]
    NotFound(PathBuf),

    /// 切り詰められた辞書ファイルのエラー
    ///
    /// [`TruncatedError`]のエラーバリアント。
    #[error(transparent)]
    Truncated(TruncatedError),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// UTF-16デコードエラー
    ///
    /// [`FromUtf16Error`](std::string::FromUtf16Error)のエラーバリアント。
    #[error(transparent)]
    Utf16(std::string::FromUtf16Error),

    /// I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WakachiError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 辞書ファイル名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }

    /// 切り詰めエラーを生成します
    pub(crate) fn truncated<S>(name: S, requested: usize, remaining: usize) -> Self
    where
        S: Into<String>,
    {
        Self::Truncated(TruncatedError {
            name: name.into(),
            requested,
            remaining,
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 辞書ファイルの内容が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// 辞書ファイルの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

/// 要求された要素数がファイルの残りより多い場合に使用されるエラー
#[derive(Debug)]
pub struct TruncatedError {
    /// 読み込み中のファイル名
    pub(crate) name: String,

    /// 要求されたバイト数
    pub(crate) requested: usize,

    /// 残りのバイト数
    pub(crate) remaining: usize,
}

impl fmt::Display for TruncatedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TruncatedError: {}: requested {} bytes, but only {} bytes remain",
            self.name, self.requested, self.remaining
        )
    }
}

impl Error for TruncatedError {}

impl From<std::num::TryFromIntError> for WakachiError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::string::FromUtf16Error> for WakachiError {
    fn from(error: std::string::FromUtf16Error) -> Self {
        Self::Utf16(error)
    }
}
