//! トークン化処理のためのルーチンを提供するモジュール。
//!
//! ワーカーは文、ラティス、最良パスのバッファを保持し、再利用することで
//! 文ごとの不要なメモリアロケーションを避けます。ワーカーはスレッド間で共有せず、
//! スレッドごとに[`Tokenizer::new_worker`]で作成してください。
use crate::errors::Result;
use crate::sentence::Sentence;
use crate::token::{Token, TokenIter};
use crate::tokenizer::lattice::{Lattice, Node};
use crate::tokenizer::Tokenizer;

/// 形態素解析を行うワーカー。
pub struct Worker {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) sent: Sentence,
    pub(crate) lattice: Lattice,
    pub(crate) top_nodes: Vec<Node>,
    pub(crate) total_cost: Option<i64>,
}

impl Worker {
    pub(crate) fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            sent: Sentence::new(),
            lattice: Lattice::default(),
            top_nodes: vec![],
            total_cost: None,
        }
    }

    /// 解析する文を設定します。
    ///
    /// 以前の解析結果は破棄されます。
    ///
    /// # 引数
    ///
    /// * `input` - 解析する文
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.top_nodes.clear();
        self.total_cost = None;
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
            self.sent.compile(self.tokenizer.dictionary().char_category());
        }
    }

    /// 設定された文を解析します。
    ///
    /// 結果は[`Worker::token`]や[`Worker::token_iter`]で取得できます。
    /// 空の文に対しては何もしません。
    ///
    /// # エラー
    ///
    /// 文末に到達するパスが存在しない場合、[`WakachiError::InvalidState`](crate::errors::WakachiError::InvalidState)を返します。
    pub fn tokenize(&mut self) -> Result<()> {
        self.top_nodes.clear();
        self.total_cost = None;
        if self.sent.len_unit() == 0 {
            return Ok(());
        }
        self.tokenizer.build_lattice(&self.sent, &mut self.lattice)?;
        self.lattice.append_top_nodes(&mut self.top_nodes);
        self.total_cost = self.lattice.total_cost();
        Ok(())
    }

    /// 解析結果のトークン数を返します。
    #[inline(always)]
    pub fn num_tokens(&self) -> usize {
        self.top_nodes.len()
    }

    /// `i`番目のトークンを返します。
    ///
    /// # Panics
    ///
    /// `i`がトークン数以上の場合にパニックします。
    #[inline(always)]
    pub fn token(&self, i: usize) -> Token<'_> {
        // top_nodes is stored from the end of the sentence.
        let index = self.num_tokens() - i - 1;
        Token::new(self, index)
    }

    /// トークンを文頭から順に返すイテレータを作成します。
    #[inline(always)]
    pub fn token_iter(&self) -> TokenIter<'_> {
        TokenIter::new(self)
    }

    /// 最良パスの総コスト（EOSまでの累積コスト）を返します。
    ///
    /// 解析前、または空の文の場合は`None`を返します。
    #[inline(always)]
    pub fn total_cost(&self) -> Option<i64> {
        self.total_cost
    }
}
