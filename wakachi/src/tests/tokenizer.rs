use crate::dictionary::connector::ConnectorCost;
use crate::dictionary::{ByteOrder, DictionaryOptions, LoadMode, WordParam};
use crate::sentence::Sentence;
use crate::tests::ipadic_like;
use crate::tokenizer::lattice::BOS_EOS_CONNECTION_ID;
use crate::{Dictionary, Tokenizer};

fn surfaces_and_starts(tokenizer: &Tokenizer, text: &str) -> Vec<(String, usize)> {
    tokenizer
        .parse(text)
        .unwrap()
        .into_iter()
        .map(|m| (m.surface, m.start))
        .collect()
}

fn pairs(expected: &[(&str, usize)]) -> Vec<(String, usize)> {
    expected.iter().map(|&(s, i)| (s.to_string(), i)).collect()
}

#[test]
fn test_greeting() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    assert_eq!(
        surfaces_and_starts(&tokenizer, "こんにちは世界"),
        pairs(&[("こんにちは", 0), ("世界", 5)])
    );
    let morphemes = tokenizer.parse("こんにちは世界").unwrap();
    assert_eq!(morphemes[1].feature, "名詞,一般,*,*,*,*,世界,セカイ,セカイ");
}

#[test]
fn test_sentence() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    assert_eq!(
        surfaces_and_starts(&tokenizer, "私の名前は中野です。"),
        pairs(&[
            ("私", 0),
            ("の", 1),
            ("名前", 2),
            ("は", 4),
            ("中野", 5),
            ("です", 7),
            ("。", 9),
        ])
    );
    assert_eq!(
        tokenizer.wakati("私の名前は中野です。").unwrap(),
        vec!["私", "の", "名前", "は", "中野", "です", "。"]
    );

    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("私の名前は中野です。");
    worker.tokenize().unwrap();
    // words 12600, links -1450
    assert_eq!(worker.total_cost(), Some(11150));
    assert_eq!(worker.token(6).total_cost(), 11150 + 400);
}

#[test]
fn test_surrogate_pair_is_one_unknown_word() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    let mut worker = tokenizer.new_worker();

    worker.reset_sentence("😳");
    worker.tokenize().unwrap();
    assert_eq!(worker.num_tokens(), 1);
    let t = worker.token(0);
    assert_eq!(t.surface(), "😳");
    assert_eq!(t.range_unit(), 0..2);
    assert_eq!(t.range_byte(), Some(0..4));
    assert_eq!(t.feature(), "記号,一般,*,*,*,*,*");

    worker.reset_sentence("😳😳");
    worker.tokenize().unwrap();
    assert_eq!(worker.num_tokens(), 1);
    assert_eq!(worker.token(0).range_unit(), 0..4);

    assert_eq!(
        surfaces_and_starts(&tokenizer, "世界😳は"),
        pairs(&[("世界", 0), ("😳", 2), ("は", 4)])
    );
}

#[test]
fn test_grouping_yields_single_morpheme() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    assert_eq!(
        surfaces_and_starts(&tokenizer, "カタカナです"),
        pairs(&[("カタカナ", 0), ("です", 4)])
    );

    // Without the long candidates the run splits into reach-sized pieces.
    let tokenizer = tokenizer.max_grouping_len(2);
    assert_eq!(
        surfaces_and_starts(&tokenizer, "カタカナです"),
        pairs(&[("カタ", 0), ("カナ", 2), ("です", 4)])
    );
}

#[test]
fn test_spaces_are_skipped() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    assert_eq!(
        surfaces_and_starts(&tokenizer, "こんにちは 世界"),
        pairs(&[("こんにちは", 0), ("世界", 6)])
    );
    assert_eq!(
        surfaces_and_starts(&tokenizer, "  世界\u{3000}\t は  "),
        pairs(&[("世界", 2), ("は", 7)])
    );
    // The cost of a space run is zero and connections see through it.
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("世界");
    worker.tokenize().unwrap();
    let plain = worker.total_cost();
    worker.reset_sentence(" 世界 ");
    worker.tokenize().unwrap();
    assert_eq!(worker.total_cost(), plain);
}

#[test]
fn test_only_spaces() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    assert!(tokenizer.parse("   ").unwrap().is_empty());
    assert!(tokenizer.parse("").unwrap().is_empty());
}

#[test]
fn test_worker_reuse() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    let mut worker = tokenizer.new_worker();

    worker.reset_sentence("私の名前は中野です。");
    worker.tokenize().unwrap();
    assert_eq!(worker.num_tokens(), 7);

    worker.reset_sentence("");
    worker.tokenize().unwrap();
    assert_eq!(worker.num_tokens(), 0);
    assert_eq!(worker.total_cost(), None);

    worker.reset_sentence("世界");
    assert_eq!(worker.num_tokens(), 0);
    worker.tokenize().unwrap();
    assert_eq!(worker.num_tokens(), 1);
}

#[test]
fn test_shared_dictionary_across_threads() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::from_shared_dictionary(std::sync::Arc::new(dict));
    let expected = tokenizer.parse("私の名前は中野です。").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tokenizer = tokenizer.clone();
            std::thread::spawn(move || tokenizer.parse("私の名前は中野です。").unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
    tokenizer.close();
}

const INPUTS: &[&str] = &[
    "私の名前は中野です。",
    "こんにちは世界",
    "中野の世界",
    "名前はカタカナ",
    "です。です",
    "界世中野前",
    "にのはで",
    "abc12漢字",
    "ﾃｽﾄ😳テスト",
    "ーーカタ",
];

#[test]
fn test_determinism_across_load_modes() {
    let source = ipadic_like();
    let (_d0, dict) = source.build();
    let tokenizer = Tokenizer::new(dict);
    let expected: Vec<_> = INPUTS
        .iter()
        .map(|s| tokenizer.parse(s).unwrap())
        .collect();

    for order in [ByteOrder::Little, ByteOrder::Big] {
        for mode in [LoadMode::Auto, LoadMode::Mmap, LoadMode::Stream] {
            for parts in [1, 3] {
                let options = DictionaryOptions::new().byte_order(order).load_mode(mode);
                let (_dir, dict) = source.build_with(options, parts);
                let tokenizer = Tokenizer::new(dict);
                for (text, expected) in INPUTS.iter().zip(&expected) {
                    assert_eq!(&tokenizer.parse(text).unwrap(), expected, "{text} {order:?} {mode:?}");
                }
            }
        }
    }
}

#[test]
fn test_coverage() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    for text in INPUTS {
        let morphemes = tokenizer.parse(text).unwrap();
        let joined: String = morphemes.iter().map(|m| m.surface.as_str()).collect();
        assert_eq!(&joined, text);

        let mut pos = 0;
        for m in &morphemes {
            assert_eq!(m.start, pos);
            pos += m.surface.encode_utf16().count();
        }
        assert_eq!(pos, text.encode_utf16().count());
    }
}

/// 同じ候補集合からすべての分割を列挙し、最小コストを求めます。
fn brute_force_min_cost(dict: &Dictionary, text: &str) -> Option<i64> {
    let mut sent = Sentence::new();
    sent.set_sentence(text);
    sent.compile(dict.char_category());
    let len = sent.len_unit();

    let mut cands: Vec<Vec<(usize, WordParam)>> = vec![vec![]; len];
    for (start, cands_at) in cands.iter_mut().enumerate() {
        let mut has_matched = false;
        for m in dict.lexicon().common_prefix_iterator(sent.units(), start) {
            cands_at.push((start + m.length, m.word_param));
            has_matched = true;
        }
        dict.unk_handler().gen_unk_words(
            &sent,
            start,
            has_matched,
            None,
            dict.char_category(),
            |w| {
                assert!(!w.is_space());
                for m in dict.lexicon().entry_iterator(w.entry_id(), w.end() - w.start()) {
                    cands_at.push((w.end(), m.word_param));
                }
            },
        );
    }

    fn dfs<C: ConnectorCost>(
        pos: usize,
        right_id: u16,
        cost: i64,
        cands: &[Vec<(usize, WordParam)>],
        conn: &C,
        best: &mut Option<i64>,
    ) {
        if pos == cands.len() {
            let total = cost + i64::from(conn.cost(right_id, BOS_EOS_CONNECTION_ID));
            *best = Some(best.map_or(total, |b| b.min(total)));
            return;
        }
        for &(end, p) in &cands[pos] {
            let c = cost + i64::from(conn.cost(right_id, p.left_id)) + i64::from(p.word_cost);
            dfs(end, p.right_id, c, cands, conn, best);
        }
    }

    let mut best = None;
    dfs(0, BOS_EOS_CONNECTION_ID, 0, &cands, dict.connector(), &mut best);
    best
}

#[test]
fn test_minimality() {
    let (_dir, dict) = ipadic_like().build();
    let tokenizer = Tokenizer::new(dict);
    let dict = tokenizer.dictionary();
    let mut worker = tokenizer.new_worker();
    for text in INPUTS {
        let expected = brute_force_min_cost(dict, text);
        worker.reset_sentence(text);
        worker.tokenize().unwrap();
        assert_eq!(worker.total_cost(), expected, "{text}");

        // The reported path realizes its own cost.
        let conn = dict.connector();
        let mut right_id = BOS_EOS_CONNECTION_ID;
        let mut cost = 0;
        for t in worker.token_iter() {
            cost += i64::from(conn.cost(right_id, t.left_id())) + i64::from(t.word_cost());
            assert_eq!(t.total_cost(), cost);
            right_id = t.right_id();
        }
        cost += i64::from(conn.cost(right_id, BOS_EOS_CONNECTION_ID));
        assert_eq!(Some(cost), expected);
    }
}

#[test]
fn test_first_minimum_wins_on_ties() {
    let source = crate::test_utils::DictionarySource {
        lexicon_csv: "ab,1,1,10,first\nab,1,1,10,second\na,1,1,5,a\nb,1,1,5,b",
        matrix_def: "2 2",
        char_def: "DEFAULT 0 1 0",
        unk_def: "DEFAULT,1,1,100,unk",
    };
    let (_dir, dict) = source.build();
    let tokenizer = Tokenizer::new(dict);
    let morphemes = tokenizer.parse("ab").unwrap();
    // a+b ties with both homographs of ab; the node inserted first wins.
    assert_eq!(morphemes.len(), 1);
    assert_eq!(morphemes[0].feature, "first");

    let morphemes = tokenizer.parse("abab").unwrap();
    let features: Vec<_> = morphemes.iter().map(|m| m.feature.as_str()).collect();
    assert_eq!(features, vec!["first", "first"]);
    for _ in 0..3 {
        assert_eq!(tokenizer.parse("abab").unwrap(), morphemes);
    }
}

fn features(tokenizer: &Tokenizer, text: &str) -> Vec<String> {
    tokenizer
        .parse(text)
        .unwrap()
        .into_iter()
        .map(|m| m.feature)
        .collect()
}

#[test]
fn test_known_word_wins_tie_with_unknown_word() {
    // KANJI and latin always invoke, so both candidates cover the same span at equal cost.
    let source = crate::test_utils::DictionarySource {
        lexicon_csv: "漢,1,1,100,known-kanji\na,1,1,100,known-latin",
        matrix_def: "2 2",
        char_def: "DEFAULT 0 1 0\nKANJI 1 0 1\nlatin 1 0 1\n\
                   0x4E00..0x9FFF KANJI\n0x0061..0x007A latin",
        unk_def: "DEFAULT,1,1,100,unk\nKANJI,1,1,100,unk-kanji\nlatin,1,1,100,unk-latin",
    };
    let (_dir, dict) = source.build();
    // "KANJI" sorts before "漢" but "latin" sorts after "a", so the unknown word
    // has the smaller word id in one case and the larger in the other.
    assert!(dict.lookup("KANJI") < dict.lookup("漢"));
    assert!(dict.lookup("latin") > dict.lookup("a"));

    let tokenizer = Tokenizer::new(dict);
    assert_eq!(features(&tokenizer, "漢"), vec!["known-kanji"]);
    assert_eq!(features(&tokenizer, "a"), vec!["known-latin"]);
    assert_eq!(features(&tokenizer, "漢a漢"), vec!["known-kanji", "known-latin", "known-kanji"]);

    // A cheaper unknown word is a live candidate and takes over.
    let source = crate::test_utils::DictionarySource {
        unk_def: "DEFAULT,1,1,100,unk\nKANJI,1,1,99,unk-kanji\nlatin,1,1,99,unk-latin",
        ..source
    };
    let (_dir, dict) = source.build();
    let tokenizer = Tokenizer::new(dict);
    assert_eq!(features(&tokenizer, "漢a"), vec!["unk-kanji", "unk-latin"]);
}
