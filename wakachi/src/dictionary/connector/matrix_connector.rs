//! 行列ベースのコネクター実装
//!
//! `matrix.bin`は`[leftSize][rightSize]`のヘッダーに続いて、
//! `leftSize * rightSize`個の16ビットコストを格納します。
//! コストは`matrix[rightId * leftSize + leftId]`で参照され、
//! `leftId`は先行する単語の右文脈ID、`rightId`は後続する単語の左文脈IDです。

use crate::dictionary::connector::{ConnectorCost, ConnectorView};
use crate::dictionary::reader::{Array, ReadArray};
use crate::errors::{Result, WakachiError};
use crate::utils::to_count;

const FILE_NAME: &str = "matrix.bin";

/// 接続コストの行列
#[derive(Debug)]
pub struct MatrixConnector {
    data: Array<i16>,
    left_size: usize,
    right_size: usize,
}

impl MatrixConnector {
    /// `matrix.bin`から行列を読み込みます。
    ///
    /// # エラー
    ///
    /// サイズが0以下の場合や、ファイルが切り詰められている場合にエラーを返します。
    pub fn from_reader<R>(rdr: &mut R) -> Result<Self>
    where
        R: ReadArray,
    {
        let left_size = to_count(rdr.get_int()?, FILE_NAME, "leftSize")?;
        let right_size = to_count(rdr.get_int()?, FILE_NAME, "rightSize")?;
        if left_size == 0 || right_size == 0 {
            return Err(WakachiError::invalid_format(
                FILE_NAME,
                format!("matrix size must be positive, got {left_size}x{right_size}"),
            ));
        }
        let len = left_size.checked_mul(right_size).ok_or_else(|| {
            WakachiError::invalid_format(FILE_NAME, "matrix size overflows")
        })?;
        let data = rdr.get_short_array(len)?;
        log::debug!("{}: {left_size}x{right_size} matrix", rdr.name());
        Ok(Self {
            data,
            left_size,
            right_size,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_vec(data: Vec<i16>, left_size: usize, right_size: usize) -> Self {
        assert_eq!(data.len(), left_size * right_size);
        Self {
            data: Array::from(data),
            left_size,
            right_size,
        }
    }

    /// 接続コストを求めます。
    ///
    /// # 引数
    ///
    /// * `left_id` - 先行する単語の右文脈ID
    /// * `right_id` - 後続する単語の左文脈ID
    #[inline(always)]
    pub fn link_cost(&self, left_id: u16, right_id: u16) -> i16 {
        self.data[usize::from(right_id) * self.left_size + usize::from(left_id)]
    }
}

impl ConnectorView for MatrixConnector {
    #[inline(always)]
    fn num_left(&self) -> usize {
        self.right_size
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        self.left_size
    }
}

impl ConnectorCost for MatrixConnector {
    #[inline(always)]
    fn cost(&self, right_id: u16, left_id: u16) -> i32 {
        i32::from(self.link_cost(right_id, left_id))
    }
}
