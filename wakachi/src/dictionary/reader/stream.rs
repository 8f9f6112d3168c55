use std::fs::File;
use std::io::{BufReader, Read};

use crate::dictionary::config::ByteOrder;
use crate::dictionary::reader::{checked_request, decode_elements, Array, Element, ReadArray};
use crate::errors::{Result, WakachiError};

/// ファイルを順に読み込み、バイト順序を変換してコピーするリーダー。
#[derive(Debug)]
pub struct StreamReader {
    name: String,
    rdr: BufReader<File>,
    order: ByteOrder,
    size: usize,
    pos: usize,
}

impl StreamReader {
    pub(crate) fn new(name: String, file: File, size: usize, order: ByteOrder) -> Self {
        Self {
            name,
            rdr: BufReader::new(file),
            order,
            size,
            pos: 0,
        }
    }
}

impl ReadArray for StreamReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn remaining(&self) -> usize {
        self.size - self.pos
    }

    fn get_array<T: Element>(&mut self, count: usize) -> Result<Array<T>> {
        let nbytes = checked_request::<T>(&self.name, count, self.remaining())?;
        let mut buf = vec![0; nbytes];
        self.rdr.read_exact(&mut buf)?;
        self.pos += nbytes;
        Ok(Array::from(decode_elements(&buf, self.order)))
    }
}

/// 分割されたファイルを連結して1つのコード単位配列として読み込みます。
///
/// 各部分の長さはコード単位の幅の倍数でなければなりません。
pub(crate) fn read_concatenated_chars(
    parts: &[std::path::PathBuf],
    order: ByteOrder,
) -> Result<Vec<u16>> {
    let mut data = vec![];
    for path in parts {
        let file = crate::dictionary::reader::open_file(path)?;
        let size = usize::try_from(file.metadata()?.len())?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if size % u16::SIZE != 0 {
            return Err(WakachiError::invalid_format(
                "word.dat",
                format!("{name} has an odd byte length {size}"),
            ));
        }
        let mut rdr = StreamReader::new(name, file, size, order);
        let chars = rdr.get_array::<u16>(size / u16::SIZE)?;
        data.extend_from_slice(&chars);
        log::debug!("{}: appended {} code units", rdr.name, chars.len());
    }
    Ok(data)
}
