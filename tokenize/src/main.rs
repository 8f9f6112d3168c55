//! 形態素解析を実行するユーティリティ
//!
//! このバイナリは、標準入力から1行ずつ読み込んだテキストを形態素解析し、
//! 指定された出力形式（mecab、wakati、detail）で結果を出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;

use wakachi::dictionary::{default_dictionary_dir, ByteOrder, DictionaryOptions, LoadMode};
use wakachi::{Dictionary, Tokenizer};

use clap::Parser;

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Mecab,
    Wakati,
    Detail,
}

impl FromStr for OutputMode {
    type Err = &'static str;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "mecab" => Ok(Self::Mecab),
            "wakati" => Ok(Self::Wakati),
            "detail" => Ok(Self::Detail),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "tokenize", about = "Predicts morphemes")]
struct Args {
    /// Dictionary directory. Defaults to $WAKACHI_DICDIR or the user data directory.
    #[clap(short = 'd', long)]
    dicdir: Option<PathBuf>,

    /// Output mode. Choices are mecab, wakati, and detail.
    #[clap(short = 'O', long, default_value = "mecab")]
    output_mode: OutputMode,

    /// Reads a dictionary written in big-endian byte order. Defaults to the host order.
    #[clap(short = 'b', long)]
    big_endian: bool,

    /// Reads dictionary files into memory instead of mapping them.
    #[clap(long)]
    no_mmap: bool,

    /// Maximum length of grouped unknown words.
    #[clap(short = 'M', long)]
    max_grouping_len: Option<usize>,
}

/// 辞書のバイト順序を決定します。指定がなければホストのバイト順序を使います。
const fn byte_order(big_endian: bool) -> ByteOrder {
    if big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::native()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let dicdir = args
        .dicdir
        .or_else(default_dictionary_dir)
        .ok_or("Could not determine the dictionary directory; use --dicdir")?;
    let options = DictionaryOptions::new()
        .byte_order(byte_order(args.big_endian))
        .load_mode(if args.no_mmap {
            LoadMode::Stream
        } else {
            LoadMode::Auto
        });

    log::info!("Loading the dictionary from {}", dicdir.display());
    let dict = Dictionary::from_dir(&dicdir, options)?;

    let tokenizer = Tokenizer::new(dict).max_grouping_len(args.max_grouping_len.unwrap_or(0));
    let mut worker = tokenizer.new_worker();

    log::info!("Ready to tokenize");

    let is_tty = std::io::stdout().is_terminal();

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        worker.reset_sentence(line);
        worker.tokenize()?;
        match args.output_mode {
            OutputMode::Mecab => {
                for t in worker.token_iter() {
                    out.write_all(t.surface().as_bytes())?;
                    out.write_all(b"\t")?;
                    out.write_all(t.feature().as_bytes())?;
                    out.write_all(b"\n")?;
                }
                out.write_all(b"EOS\n")?;
            }
            OutputMode::Wakati => {
                for (i, t) in worker.token_iter().enumerate() {
                    if i != 0 {
                        out.write_all(b" ")?;
                    }
                    out.write_all(t.surface().as_bytes())?;
                }
                out.write_all(b"\n")?;
            }
            OutputMode::Detail => {
                for t in worker.token_iter() {
                    writeln!(
                        &mut out,
                        "{}\t{}\tstart={}\tword_id={}\tleft_id={}\tright_id={}\tword_cost={}\ttotal_cost={}",
                        t.surface(),
                        t.feature(),
                        t.start(),
                        t.word_id(),
                        t.left_id(),
                        t.right_id(),
                        t.word_cost(),
                        t.total_cost(),
                    )?;
                }
                out.write_all(b"EOS\n")?;
            }
        }
        if is_tty {
            out.flush()?;
        }
    }
    out.flush()?;
    drop(worker);
    tokenizer.close();

    Ok(())
}
