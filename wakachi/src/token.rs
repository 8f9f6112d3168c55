//! トークンの結果コンテナ
//!
//! このモジュールは、形態素解析の結果として得られるトークンを表現する型を提供します。
//! トークンはワーカー内の最良パスのノードへの参照を保持し、表層形、素性、
//! 位置情報などへのアクセスを提供します。

use std::borrow::Cow;
use std::ops::Range;

use crate::tokenizer::lattice::Node;
use crate::tokenizer::worker::Worker;
use crate::utils::parse_csv_row;

/// 形態素解析の結果トークン
///
/// このトークンは[`Worker`]への軽量な参照であり、実際のデータは
/// Workerが保持しています。トークンはWorkerが生存している間のみ有効です。
///
/// 位置はUTF-16のコード単位で数えます。サロゲートペアで表される文字は2単位を占めます。
pub struct Token<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> Token<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn node(&self) -> &'w Node {
        &self.worker.top_nodes[self.index]
    }

    /// トークンのコード単位での位置範囲を取得します。
    #[inline(always)]
    pub fn range_unit(&self) -> Range<usize> {
        let node = self.node();
        node.start..node.end
    }

    /// トークンの開始位置（コード単位）を取得します。
    #[inline(always)]
    pub fn start(&self) -> usize {
        self.node().start
    }

    /// トークンのバイト単位の位置範囲を取得します。
    ///
    /// # 戻り値
    ///
    /// 範囲の両端が文字の境界であればバイト範囲を、
    /// どちらかがサロゲートペアの途中を指す場合は`None`を返します。
    #[inline(always)]
    pub fn range_byte(&self) -> Option<Range<usize>> {
        let sent = &self.worker.sent;
        let node = self.node();
        Some(sent.byte_position(node.start)?..sent.byte_position(node.end)?)
    }

    /// トークンの表層形を取得します。
    ///
    /// # 戻り値
    ///
    /// 通常は入力文字列のスライスを借用して返します。トークンの境界が
    /// サロゲートペアを分割している場合は、置換文字を含む新しい文字列を返します。
    #[inline(always)]
    pub fn surface(&self) -> Cow<'w, str> {
        self.worker.sent.surface(self.range_unit())
    }

    /// トークンの単語IDを取得します。
    #[inline(always)]
    pub fn word_id(&self) -> u32 {
        self.node().word_id
    }

    /// トークンの素性（品詞などの情報）を取得します。
    ///
    /// 素性の形式は辞書によって異なります。IPADICの場合は
    /// `名詞,一般,*,*,*,*,世界,セカイ,セカイ`のようなカンマ区切りの文字列です。
    #[inline(always)]
    pub fn feature(&self) -> String {
        self.worker
            .tokenizer
            .dictionary()
            .word_feature(self.word_id())
    }

    /// トークンの素性をカンマで分割したフィールドを取得します。
    ///
    /// ダブルクォートで囲まれたフィールド内のカンマは区切りとして扱いません。
    pub fn feature_fields(&self) -> Vec<String> {
        parse_csv_row(&self.feature())
    }

    /// トークンノードの左文脈IDを取得します。
    #[inline(always)]
    pub fn left_id(&self) -> u16 {
        self.node().left_id
    }

    /// トークンノードの右文脈IDを取得します。
    #[inline(always)]
    pub fn right_id(&self) -> u16 {
        self.node().right_id
    }

    /// トークンの単語コストを取得します。
    #[inline(always)]
    pub fn word_cost(&self) -> i16 {
        self.node().word_cost
    }

    /// BOSからこのトークンまでの累積コストを取得します。
    #[inline(always)]
    pub fn total_cost(&self) -> i64 {
        self.node().min_cost
    }

    /// 所有権を持つ形態素に変換します。
    pub fn to_buf(&self) -> Morpheme {
        Morpheme {
            surface: self.surface().into_owned(),
            feature: self.feature(),
            start: self.start(),
        }
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface())
            .field("range_unit", &self.range_unit())
            .field("range_byte", &self.range_byte())
            .field("feature", &self.feature())
            .field("word_id", &self.word_id())
            .field("left_id", &self.left_id())
            .field("right_id", &self.right_id())
            .field("word_cost", &self.word_cost())
            .field("total_cost", &self.total_cost())
            .finish()
    }
}

/// トークンを文頭から順に返すイテレータ
pub struct TokenIter<'w> {
    worker: &'w Worker,
    front: usize,
    back: usize,
}

impl<'w> TokenIter<'w> {
    #[inline(always)]
    pub(crate) fn new(worker: &'w Worker) -> Self {
        let num_tokens = worker.num_tokens();
        Self {
            worker,
            front: 0,
            back: num_tokens,
        }
    }
}

impl<'w> Iterator for TokenIter<'w> {
    type Item = Token<'w>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let t = self.worker.token(self.front);
            self.front += 1;
            Some(t)
        } else {
            None
        }
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for TokenIter<'_> {
    #[inline(always)]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.worker.token(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for TokenIter<'_> {}

/// 形態素解析の結果として得られる1つの形態素
///
/// [`Token`]と異なり、ワーカーから独立して保持できます。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Morpheme {
    /// 表層形
    pub surface: String,

    /// 素性
    pub feature: String,

    /// 開始位置（UTF-16のコード単位）
    pub start: usize,
}

impl<'w> From<Token<'w>> for Morpheme {
    fn from(token: Token<'w>) -> Self {
        token.to_buf()
    }
}
