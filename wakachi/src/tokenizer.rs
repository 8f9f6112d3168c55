//! Viterbiアルゴリズムに基づくトークナイザー。
//!
//! このモジュールは、日本語形態素解析のためのメイントークナイザーを提供します。
//! 入力文の各位置から辞書の共通接頭辞検索と未知語処理で候補を列挙し、
//! ラティス上の最小コストパスとして最適な形態素列を求めます。
//!
//! # 主要な構造体
//!
//! - [`Tokenizer`]: 形態素解析を実行するメイントークナイザー構造体
//! - [`Worker`]: トークナイザーのワーカー。実際の解析処理を行う
//!
//! # 例
//!
//! ```no_run
//! use wakachi::{Dictionary, Tokenizer};
//!
//! let dict = Dictionary::from_default_dir()?;
//! let tokenizer = Tokenizer::new(dict);
//! let mut worker = tokenizer.new_worker();
//!
//! worker.reset_sentence("自然言語処理");
//! worker.tokenize()?;
//!
//! for i in 0..worker.num_tokens() {
//!     let token = worker.token(i);
//!     println!("{}\t{}", token.surface(), token.feature());
//! }
//! # Ok::<(), wakachi::errors::WakachiError>(())
//! ```
pub(crate) mod lattice;
pub mod worker;

use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::sentence::Sentence;
use crate::token::Morpheme;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::worker::Worker;

/// 形態素解析を行うトークナイザー。
///
/// 辞書は[`Arc`]で共有されるため、トークナイザーの複製は安価で、
/// 複数のスレッドでそれぞれワーカーを作成して並行に解析できます。
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
    max_grouping_len: Option<usize>,
}

impl Tokenizer {
    /// 辞書から新しいトークナイザーを作成します。
    ///
    /// # 引数
    ///
    /// * `dict` - 解析に使用する辞書
    pub fn new(dict: Dictionary) -> Self {
        Self::from_shared_dictionary(Arc::new(dict))
    }

    /// 共有された辞書から新しいトークナイザーを作成します。
    ///
    /// 同じ辞書を複数のトークナイザーで使う場合に、再読み込みを避けられます。
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self {
            dict,
            max_grouping_len: None,
        }
    }

    /// 未知語のグループ化で生成される候補の最大長を設定します。
    ///
    /// 同じカテゴリの文字が長く続く場合、すべてをまとめた候補は解析を遅くすることがあります。
    /// この上限を超える長さのグループ化候補は生成されません。
    ///
    /// # 引数
    ///
    /// * `max_grouping_len` - 候補の最大長（コード単位）。`0`の場合は無制限（デフォルト）
    pub const fn max_grouping_len(mut self, max_grouping_len: usize) -> Self {
        if max_grouping_len != 0 {
            self.max_grouping_len = Some(max_grouping_len);
        } else {
            self.max_grouping_len = None;
        }
        self
    }

    /// 辞書への参照を取得します。
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// 新しいワーカーを作成します。
    ///
    /// ワーカーは解析用の内部バッファを保持します。スレッドごとに1つ作成し、
    /// 複数の文の解析に再利用してください。
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// テキストを解析し、形態素の列を返します。
    ///
    /// 呼び出しごとに新しいワーカーを作成します。多数の文を解析する場合は、
    /// [`Tokenizer::new_worker`]で作成したワーカーを再利用する方が効率的です。
    ///
    /// # エラー
    ///
    /// 文末に到達するパスが存在しない場合、[`WakachiError::InvalidState`](crate::errors::WakachiError::InvalidState)を返します。
    ///
    /// # 例
    ///
    /// ```no_run
    /// use wakachi::{Dictionary, Tokenizer};
    ///
    /// let tokenizer = Tokenizer::new(Dictionary::from_default_dir()?);
    /// for m in tokenizer.parse("私の名前は中野です。")? {
    ///     println!("{}\t{}\t{}", m.surface, m.feature, m.start);
    /// }
    /// # Ok::<(), wakachi::errors::WakachiError>(())
    /// ```
    pub fn parse(&self, text: &str) -> Result<Vec<Morpheme>> {
        let mut worker = self.new_worker();
        worker.reset_sentence(text);
        worker.tokenize()?;
        Ok(worker.token_iter().map(|t| t.to_buf()).collect())
    }

    /// テキストを分かち書きし、表層形の列を返します。
    ///
    /// # エラー
    ///
    /// [`Tokenizer::parse`]と同じです。
    pub fn wakati(&self, text: &str) -> Result<Vec<String>> {
        let mut worker = self.new_worker();
        worker.reset_sentence(text);
        worker.tokenize()?;
        Ok(worker
            .token_iter()
            .map(|t| t.surface().into_owned())
            .collect())
    }

    /// トークナイザーを破棄し、辞書への参照を手放します。
    ///
    /// 辞書のメモリマップは、辞書を参照しているすべてのトークナイザーとワーカーが
    /// 破棄された時点で解放されます。
    pub fn close(self) {
        log::debug!(
            "closing tokenizer ({} other holders of the dictionary)",
            Arc::strong_count(&self.dict) - 1
        );
    }

    pub(crate) fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) -> Result<()> {
        let dict = &*self.dict;
        let lexicon = dict.lexicon();
        let connector = dict.connector();
        let char_cat = dict.char_category();
        let unk_handler = dict.unk_handler();
        let text = sent.units();

        lattice.reset(sent.len_unit());

        for start in 0..sent.len_unit() {
            // Nothing reaches here, e.g. inside a known word whose head does not invoke.
            if !lattice.has_previous_node(start) {
                continue;
            }

            let mut has_matched = false;
            for m in lexicon.common_prefix_iterator(text, start) {
                debug_assert!(m.length > 0);
                lattice.insert_node(start, start + m.length, m.word_id, m.word_param, connector);
                has_matched = true;
            }

            unk_handler.gen_unk_words(
                sent,
                start,
                has_matched,
                self.max_grouping_len,
                char_cat,
                |w| {
                    if w.is_space() {
                        lattice.propagate(w.start(), w.end());
                        return;
                    }
                    for m in lexicon.entry_iterator(w.entry_id(), w.end() - w.start()) {
                        lattice.insert_node(w.start(), w.end(), m.word_id, m.word_param, connector);
                    }
                },
            );
        }

        lattice.insert_eos(connector)
    }
}
