use std::sync::Arc;

use memmap2::Mmap;

use crate::dictionary::config::ByteOrder;
use crate::dictionary::reader::{checked_request, decode_elements, Array, Element, ReadArray};
use crate::errors::Result;

/// 読み取り専用のメモリマップからゼロコピーのビューを切り出すリーダー。
///
/// バイト順序はホストと一致していることが前提です。
#[derive(Debug)]
pub struct MappedReader {
    name: String,
    map: Arc<Mmap>,
    pos: usize,
}

impl MappedReader {
    pub(crate) fn new(name: String, map: Arc<Mmap>) -> Self {
        Self { name, map, pos: 0 }
    }
}

impl ReadArray for MappedReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.map.len()
    }

    fn remaining(&self) -> usize {
        self.map.len() - self.pos
    }

    fn get_array<T: Element>(&mut self, count: usize) -> Result<Array<T>> {
        let nbytes = checked_request::<T>(&self.name, count, self.remaining())?;
        let start = self.pos;
        self.pos += nbytes;
        if let Some(view) = Array::mapped(Arc::clone(&self.map), start, count) {
            return Ok(view);
        }
        log::warn!(
            "{}: offset {start} is not aligned to {} bytes, copying {count} elements",
            self.name,
            std::mem::align_of::<T>()
        );
        Ok(Array::from(decode_elements(
            &self.map[start..start + nbytes],
            ByteOrder::native(),
        )))
    }
}
