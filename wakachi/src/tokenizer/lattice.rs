//! ラティス（格子）構造の実装モジュール。
//!
//! このモジュールは、形態素解析におけるViterbiアルゴリズムのための
//! ラティス構造を提供します。ノードは1回の解析の間だけ生きるアリーナに格納され、
//! 最小コストの前ノードへの参照はアリーナ内の添字で表されます。
use crate::dictionary::connector::ConnectorCost;
use crate::dictionary::lexicon::WordParam;
use crate::errors::{Result, WakachiError};

/// BOS/EOSノードの文脈ID
pub const BOS_EOS_CONNECTION_ID: u16 = 0;

const INVALID_IDX: u32 = u32::MAX;

/// ラティス内のノード。
///
/// 各ノードは単語の候補を表し、位置情報、接続ID、累積コストなどを保持します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// 単語ID。
    pub word_id: u32,
    /// 単語の開始位置（コード単位）。
    pub start: usize,
    /// 単語の終了位置（コード単位）。
    pub end: usize,
    /// 左側の接続ID。
    pub left_id: u16,
    /// 右側の接続ID。
    pub right_id: u16,
    /// 単語コスト。
    pub word_cost: i16,
    /// BOSからこのノードまでの最小コスト。
    pub min_cost: i64,
    /// 最小コストを持つ左側ノードのアリーナ内の添字。
    pub prev: u32,
}

impl Node {
    /// このノードがBOS（文頭）ノードかどうかを判定します。
    #[inline(always)]
    pub fn is_bos(&self) -> bool {
        self.prev == INVALID_IDX
    }
}

/// 1-best解用のラティス構造体。
///
/// `ends[i]`は位置`i`で終わるノードの添字を、挿入された順に保持します。
/// 空白カテゴリの候補によって、同じノードが複数の位置に現れることがあります。
#[derive(Default)]
pub struct Lattice {
    nodes: Vec<Node>,
    ends: Vec<Vec<u32>>,
    eos: Option<Node>,
    len_unit: usize, // needed for avoiding to free ends
}

impl Lattice {
    /// ラティスをリセットし、新しい文の処理を準備します。
    ///
    /// # 引数
    ///
    /// * `len_unit` - 新しい文のコード単位数
    pub fn reset(&mut self, len_unit: usize) {
        Self::reset_vec(&mut self.ends, len_unit + 1);
        self.nodes.clear();
        self.len_unit = len_unit;
        self.eos = None;
        self.insert_bos();
    }

    fn reset_vec<T>(data: &mut Vec<Vec<T>>, new_len: usize) {
        for v in data.iter_mut() {
            v.clear();
        }
        let cur_len = data.len();
        if cur_len <= new_len {
            data.reserve(new_len - cur_len);
            for _ in cur_len..new_len {
                data.push(Vec::with_capacity(16))
            }
        }
    }

    /// 設定された文のコード単位数を返します。
    #[inline(always)]
    pub const fn len_unit(&self) -> usize {
        self.len_unit
    }

    /// BOS（文頭）ノードを挿入します。
    fn insert_bos(&mut self) {
        self.nodes.push(Node {
            word_id: u32::MAX,
            start: 0,
            end: 0,
            left_id: BOS_EOS_CONNECTION_ID,
            right_id: BOS_EOS_CONNECTION_ID,
            word_cost: 0,
            min_cost: 0,
            prev: INVALID_IDX,
        });
        self.ends[0].push(0);
    }

    /// EOS（文末）ノードを挿入します。
    ///
    /// # エラー
    ///
    /// 文末で終わるノードが1つもない場合、[`WakachiError::InvalidState`]を返します。
    pub fn insert_eos<C>(&mut self, connector: &C) -> Result<()>
    where
        C: ConnectorCost,
    {
        let end = self.len_unit;
        let (prev, min_cost) = self
            .search_min_node(end, BOS_EOS_CONNECTION_ID, connector)
            .ok_or_else(|| {
                WakachiError::invalid_state(
                    "no path reaches the end of the sentence",
                    format!("position {end} has no node"),
                )
            })?;
        self.eos = Some(Node {
            word_id: u32::MAX,
            start: end,
            end,
            left_id: BOS_EOS_CONNECTION_ID,
            right_id: BOS_EOS_CONNECTION_ID,
            word_cost: 0,
            min_cost,
            prev,
        });
        Ok(())
    }

    /// ラティスに新しいノードを挿入します。
    ///
    /// `start`で終わるノードの中から、接続コストを含めて最小コストとなる前ノードを選び、
    /// 累積コストに単語コストを加えたノードを`end`に追加します。
    ///
    /// # 引数
    ///
    /// * `start` - 単語の開始位置
    /// * `end` - 単語の終了位置
    /// * `word_id` - 単語ID
    /// * `word_param` - 単語パラメータ（接続ID、コストなど）
    /// * `connector` - 接続コスト計算用のコネクタ
    pub fn insert_node<C>(
        &mut self,
        start: usize,
        end: usize,
        word_id: u32,
        word_param: WordParam,
        connector: &C,
    ) where
        C: ConnectorCost,
    {
        debug_assert!(start < end);
        let Some((prev, min_cost)) = self.search_min_node(start, word_param.left_id, connector)
        else {
            debug_assert!(false, "no node ends at {start}");
            return;
        };
        let idx = self.nodes.len() as u32;
        self.nodes.push(Node {
            word_id,
            start,
            end,
            left_id: word_param.left_id,
            right_id: word_param.right_id,
            word_cost: word_param.word_cost,
            min_cost: min_cost + i64::from(word_param.word_cost),
            prev,
        });
        self.ends[end].push(idx);
    }

    /// `start`で終わるすべてのノードを`end`にも追加します。
    ///
    /// 空白カテゴリの候補はノードを作らず、前ノードの集合をそのまま先へ伝播します。
    pub fn propagate(&mut self, start: usize, end: usize) {
        debug_assert!(start < end);
        let (lhs, rhs) = self.ends.split_at_mut(end);
        rhs[0].extend_from_slice(&lhs[start]);
    }

    /// 最小コストの前ノードを探します。
    ///
    /// 同じコストの場合は先に挿入されたノードが優先されます。
    fn search_min_node<C>(&self, start: usize, left_id: u16, connector: &C) -> Option<(u32, i64)>
    where
        C: ConnectorCost,
    {
        let mut min_idx = INVALID_IDX;
        let mut min_cost = i64::MAX;
        for &i in &self.ends[start] {
            let left_node = &self.nodes[i as usize];
            let conn_cost = i64::from(connector.cost(left_node.right_id, left_id));
            let new_cost = left_node.min_cost + conn_cost;
            if new_cost < min_cost {
                min_idx = i;
                min_cost = new_cost;
            }
        }
        (min_idx != INVALID_IDX).then_some((min_idx, min_cost))
    }

    /// 指定位置に少なくとも1つのノードが存在するかチェックします。
    #[inline(always)]
    pub fn has_previous_node(&self, i: usize) -> bool {
        self.ends.get(i).map(|d| !d.is_empty()).unwrap_or(false)
    }

    /// EOSノードの累積コストを返します。
    #[inline(always)]
    pub fn total_cost(&self) -> Option<i64> {
        self.eos.map(|n| n.min_cost)
    }

    /// 最良パスのノードをベクトルに追加します。
    ///
    /// EOSから後方にたどり、最良パスを構成するすべてのノードを文末側から順に追加します。
    pub fn append_top_nodes(&self, top_nodes: &mut Vec<Node>) {
        let Some(eos) = self.eos.as_ref() else {
            return;
        };
        let mut idx = eos.prev;
        while idx != INVALID_IDX {
            let node = &self.nodes[idx as usize];
            if node.is_bos() {
                break;
            }
            top_nodes.push(*node);
            idx = node.prev;
        }
    }

    #[cfg(test)]
    pub(crate) fn ends(&self, i: usize) -> impl Iterator<Item = &Node> + '_ {
        self.ends[i].iter().map(|&idx| &self.nodes[idx as usize])
    }
}
