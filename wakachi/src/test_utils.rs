//! テスト用ユーティリティ
//!
//! MeCab風のCSV文字列から、テスト用のバイナリ辞書ディレクトリを書き出します。
//! トライはテール付きのダブル配列として構築され、どちらのバイト順序でも書き出せます。

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use hashbrown::{HashMap, HashSet};
use tempfile::TempDir;

use crate::dictionary::character::NUM_CODE_UNITS;
use crate::dictionary::config::{ByteOrder, DictionaryOptions};
use crate::dictionary::lexicon::trie::{TERMINATE_CODE, VACANT_CODE};
use crate::utils::parse_csv_row;
use crate::Dictionary;

/// バイト順序を指定して整数を書き込むバッファ
#[derive(Default)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    pub(crate) fn new(order: ByteOrder) -> Self {
        Self { buf: vec![], order }
    }

    pub(crate) fn i32(&mut self, v: i32) -> &mut Self {
        match self.order {
            ByteOrder::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
        self
    }

    pub(crate) fn i16(&mut self, v: i16) -> &mut Self {
        match self.order {
            ByteOrder::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
        self
    }

    pub(crate) fn u16(&mut self, v: u16) -> &mut Self {
        match self.order {
            ByteOrder::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
        }
        self
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

struct TrieBuilder<'a> {
    keys: &'a [Vec<u16>],
    base: Vec<i32>,
    chck: Vec<u16>,
    used: Vec<bool>,
    // A slot's parent is `idx - check[idx]`, so no two nodes may share a base.
    used_bases: HashSet<usize>,
    begs: Vec<i32>,
    lens: Vec<i16>,
    tail: Vec<u16>,
}

impl<'a> TrieBuilder<'a> {
    fn new(keys: &'a [Vec<u16>]) -> Self {
        Self {
            keys,
            // Slot 0 holds the root.
            base: vec![0],
            chck: vec![VACANT_CODE],
            used: vec![true],
            used_bases: HashSet::new(),
            begs: vec![0; keys.len()],
            lens: vec![0; keys.len()],
            tail: vec![],
        }
    }

    fn code_at(&self, id: usize, depth: usize) -> u16 {
        self.keys[id].get(depth).copied().unwrap_or(TERMINATE_CODE)
    }

    fn find_base(&self, codes: &[u16]) -> usize {
        let mut b = 1;
        while self.used_bases.contains(&b)
            || codes
                .iter()
                .any(|&c| self.used.get(b + usize::from(c)).copied().unwrap_or(false))
        {
            b += 1;
        }
        b
    }

    fn reserve(&mut self, len: usize) {
        if self.base.len() < len {
            self.base.resize(len, 0);
            self.chck.resize(len, VACANT_CODE);
            self.used.resize(len, false);
        }
    }

    /// `ids`（キーの昇順）を子に持つノードを配置し、その`base`を返します。
    fn build(&mut self, ids: &[usize], depth: usize) -> i32 {
        let mut groups: Vec<(u16, Vec<usize>)> = vec![];
        for &id in ids {
            let code = self.code_at(id, depth);
            match groups.last_mut() {
                Some((c, g)) if *c == code => g.push(id),
                _ => groups.push((code, vec![id])),
            }
        }
        let codes: Vec<u16> = groups.iter().map(|(c, _)| *c).collect();
        let b = self.find_base(&codes);
        self.used_bases.insert(b);
        let max_code = codes.iter().copied().max().unwrap_or(0);
        self.reserve(b + usize::from(max_code) + 1);
        for &c in &codes {
            let slot = b + usize::from(c);
            self.used[slot] = true;
            self.chck[slot] = c;
        }

        let keys = self.keys;
        for (code, group) in groups {
            let slot = b + usize::from(code);
            if let [id] = group[..] {
                let rest: &[u16] = if code == TERMINATE_CODE {
                    &[]
                } else {
                    &keys[id][depth + 1..]
                };
                self.begs[id] = self.tail.len() as i32;
                self.lens[id] = rest.len() as i16;
                self.tail.extend_from_slice(rest);
                self.base[slot] = -(id as i32) - 1;
            } else {
                assert_ne!(code, TERMINATE_CODE, "duplicate trie key");
                let child = self.build(&group, depth + 1);
                self.base[slot] = child;
            }
        }
        b as i32
    }

    fn write(mut self, order: ByteOrder) -> Vec<u8> {
        let mut ids: Vec<usize> = (0..self.keys.len()).collect();
        ids.sort_by(|&a, &b| self.keys[a].cmp(&self.keys[b]));
        self.base[0] = self.build(&ids, 0);

        let mut w = ByteWriter::new(order);
        w.i32(self.base.len() as i32)
            .i32(self.keys.len() as i32)
            .i32(self.tail.len() as i32);
        self.begs.iter().for_each(|&v| {
            w.i32(v);
        });
        self.base.iter().for_each(|&v| {
            w.i32(v);
        });
        self.lens.iter().for_each(|&v| {
            w.i16(v);
        });
        self.chck.iter().for_each(|&v| {
            w.u16(v);
        });
        self.tail.iter().for_each(|&v| {
            w.u16(v);
        });
        w.into_bytes()
    }
}

/// キーの配列から`word2id`形式のトライを書き出します。
///
/// キーのエントリIDは配列内の添字になります。キーは空でなく、
/// 予約コード（0と1）を含んではいけません。
pub(crate) fn write_trie(path: &Path, keys: &[Vec<u16>], order: ByteOrder) -> io::Result<()> {
    for key in keys {
        assert!(!key.is_empty());
        assert!(key.iter().all(|&c| c != TERMINATE_CODE && c != VACANT_CODE));
    }
    fs::write(path, TrieBuilder::new(keys).write(order))
}

#[derive(Clone)]
struct WordRow {
    left_id: i16,
    right_id: i16,
    cost: i16,
    feature: String,
}

struct CharDef {
    // (name, invoke, group, length)
    categories: Vec<(String, bool, bool, i32)>,
    char2id: Vec<i32>,
    masks: Vec<i32>,
}

fn join_csv(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains([',', '"']) {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_word_rows(csv: &str) -> Vec<(String, WordRow)> {
    csv.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields = parse_csv_row(line);
            assert!(fields.len() >= 5, "invalid row: {line}");
            (
                fields[0].clone(),
                WordRow {
                    left_id: fields[1].parse().unwrap(),
                    right_id: fields[2].parse().unwrap(),
                    cost: fields[3].parse().unwrap(),
                    feature: join_csv(&fields[4..]),
                },
            )
        })
        .collect()
}

fn parse_code(s: &str) -> usize {
    usize::from_str_radix(s.trim_start_matches("0x").trim_start_matches("0X"), 16).unwrap()
}

/// `char.def`形式のカテゴリ定義を解析します。
///
/// カテゴリ行は`NAME INVOKE GROUP LENGTH`、対応行は
/// `0xXXXX[..0xYYYY] NAME [COMPAT...]`です。`DEFAULT`は必須です。
fn parse_char_def(def: &str) -> CharDef {
    let mut categories = vec![];
    let mut name2idx = HashMap::new();
    let mut mappings = vec![];
    for line in def.lines() {
        let line = line.split('#').next().unwrap().trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols[0].starts_with("0x") {
            mappings.push(cols);
        } else {
            name2idx.insert(cols[0].to_string(), categories.len());
            categories.push((
                cols[0].to_string(),
                cols[1] == "1",
                cols[2] == "1",
                cols[3].parse().unwrap(),
            ));
        }
    }

    let default = name2idx["DEFAULT"];
    let mut char2id = vec![default as i32; NUM_CODE_UNITS];
    let mut masks = vec![1 << default; NUM_CODE_UNITS];
    for cols in mappings {
        let (lo, hi) = match cols[0].split_once("..") {
            Some((lo, hi)) => (parse_code(lo), parse_code(hi)),
            None => (parse_code(cols[0]), parse_code(cols[0])),
        };
        let main = name2idx[cols[1]];
        let mask = cols[1..]
            .iter()
            .fold(0, |m, name| m | (1 << name2idx[*name]));
        for code in lo..=hi.min(NUM_CODE_UNITS - 1) {
            char2id[code] = main as i32;
            masks[code] = mask;
        }
    }
    CharDef {
        categories,
        char2id,
        masks,
    }
}

/// テスト用辞書の定義
///
/// - `lexicon_csv`: `表層形,左文脈ID,右文脈ID,コスト,素性...`
/// - `matrix_def`: 1行目が`leftSize rightSize`、以降が`leftId rightId cost`
/// - `char_def`: [`parse_char_def`]の形式
/// - `unk_def`: `カテゴリ名,左文脈ID,右文脈ID,コスト,素性...`
pub(crate) struct DictionarySource<'a> {
    pub lexicon_csv: &'a str,
    pub matrix_def: &'a str,
    pub char_def: &'a str,
    pub unk_def: &'a str,
}

impl DictionarySource<'_> {
    /// 辞書ディレクトリを書き出します。
    ///
    /// `data_parts`が2以上の場合、素性データを`word.dat.0`、`word.dat.1`...に分割します。
    pub(crate) fn write(&self, dir: &Path, order: ByteOrder, data_parts: usize) -> io::Result<()> {
        let char_def = parse_char_def(self.char_def);

        // Category names share the trie with surfaces.
        let mut entries: BTreeMap<Vec<u16>, Vec<WordRow>> = BTreeMap::new();
        for (name, ..) in &char_def.categories {
            entries.entry(name.encode_utf16().collect()).or_default();
        }
        for (surface, row) in parse_word_rows(self.unk_def)
            .into_iter()
            .chain(parse_word_rows(self.lexicon_csv))
        {
            entries
                .entry(surface.encode_utf16().collect())
                .or_default()
                .push(row);
        }
        let keys: Vec<Vec<u16>> = entries.keys().cloned().collect();
        let key2id: HashMap<&[u16], usize> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_slice(), i))
            .collect();
        write_trie(&dir.join("word2id"), &keys, order)?;

        let mut indices = ByteWriter::new(order);
        let mut words = vec![];
        for rows in entries.values() {
            indices.i32(words.len() as i32);
            words.extend(rows.iter().cloned());
        }
        indices.i32(words.len() as i32);
        fs::write(dir.join("word.ary.idx"), indices.into_bytes())?;

        let mut data = ByteWriter::new(order);
        let mut offsets = vec![];
        let mut len = 0;
        for w in &words {
            offsets.push(len);
            for u in w.feature.encode_utf16() {
                data.u16(u);
                len += 1;
            }
        }
        offsets.push(len);
        let data = data.into_bytes();
        if data_parts > 1 {
            let units = data.len() / 2;
            let per_part = units.div_ceil(data_parts).max(1) * 2;
            for (i, chunk) in data.chunks(per_part).enumerate() {
                fs::write(dir.join(format!("word.dat.{i}")), chunk)?;
            }
        } else {
            fs::write(dir.join("word.dat"), &data)?;
        }

        // The last entry is a sentinel.
        let mut inf = ByteWriter::new(order);
        offsets.iter().for_each(|&o| {
            inf.i32(o);
        });
        let columns: [fn(&WordRow) -> i16; 3] = [|w| w.left_id, |w| w.right_id, |w| w.cost];
        for field in columns {
            words.iter().for_each(|w| {
                inf.i16(field(w));
            });
            inf.i16(0);
        }
        fs::write(dir.join("word.inf"), inf.into_bytes())?;

        let mut lines = self.matrix_def.lines();
        let header: Vec<usize> = lines
            .next()
            .unwrap()
            .split_whitespace()
            .map(|s| s.parse().unwrap())
            .collect();
        let (left_size, right_size) = (header[0], header[1]);
        let mut costs = vec![0i16; left_size * right_size];
        for line in lines.filter(|l| !l.trim().is_empty()) {
            let cols: Vec<i32> = line
                .split_whitespace()
                .map(|s| s.parse().unwrap())
                .collect();
            costs[cols[1] as usize * left_size + cols[0] as usize] = cols[2] as i16;
        }
        let mut matrix = ByteWriter::new(order);
        matrix.i32(left_size as i32).i32(right_size as i32);
        costs.iter().for_each(|&c| {
            matrix.i16(c);
        });
        fs::write(dir.join("matrix.bin"), matrix.into_bytes())?;

        let mut category = ByteWriter::new(order);
        for (name, invoke, group, length) in &char_def.categories {
            let key: Vec<u16> = name.encode_utf16().collect();
            category
                .i32(key2id[key.as_slice()] as i32)
                .i32(*length)
                .i32(i32::from(*invoke))
                .i32(i32::from(*group));
        }
        fs::write(dir.join("char.category"), category.into_bytes())?;

        let mut code2category = ByteWriter::new(order);
        char_def
            .char2id
            .iter()
            .chain(char_def.masks.iter())
            .for_each(|&v| {
                code2category.i32(v);
            });
        fs::write(dir.join("code2category"), code2category.into_bytes())?;
        Ok(())
    }

    /// ホストのバイト順序で一時ディレクトリに書き出し、辞書を読み込みます。
    pub(crate) fn build(&self) -> (TempDir, Dictionary) {
        self.build_with(DictionaryOptions::default(), 1)
    }

    /// 指定したオプションのバイト順序で書き出し、同じオプションで読み込みます。
    pub(crate) fn build_with(&self, options: DictionaryOptions, data_parts: usize) -> (TempDir, Dictionary) {
        let dir = tempfile::tempdir().unwrap();
        self.write(dir.path(), options.get_byte_order(), data_parts)
            .unwrap();
        let dict = Dictionary::from_dir(dir.path(), options).unwrap();
        (dir, dict)
    }
}
