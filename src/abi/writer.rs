//! Word-aligned ABI writer
//!
//! [`Writer`] is an append-only buffer whose every write is padded to a
//! whole number of words. [`HeadTailWriter`] stages one tuple level: static
//! values go into the head in place, dynamic values go into a separate tail
//! and leave a pointer entry in the head. The pointers are resolved in
//! [`HeadTailWriter::finish`], once the head length is known.

use ethers_core::types::U256;

use crate::config::WORD_SIZE;
use crate::error::AbiResult;
use crate::utils::crypto::encode_hex;

/// Append-only, word-padded byte buffer
#[derive(Debug, Clone, Default)]
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far, always a multiple of the word size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes, zero-padded on the right to the next word boundary
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.data.extend_from_slice(bytes);
        let padding = (WORD_SIZE - bytes.len() % WORD_SIZE) % WORD_SIZE;
        self.data.resize(self.data.len() + padding, 0);
        bytes.len() + padding
    }

    /// Write one full word verbatim
    pub fn write_word(&mut self, word: &[u8; WORD_SIZE]) -> usize {
        self.data.extend_from_slice(word);
        WORD_SIZE
    }

    /// Write an unsigned integer as one big-endian word
    pub fn write_value(&mut self, value: U256) -> usize {
        let mut word = [0u8; WORD_SIZE];
        value.to_big_endian(&mut word);
        self.write_word(&word)
    }

    /// Write a length or offset
    pub fn write_index(&mut self, value: usize) -> usize {
        self.write_value(U256::from(value as u64))
    }

    /// Append everything another writer produced
    pub fn append_writer(&mut self, other: Writer) -> usize {
        let len = other.data.len();
        self.data.extend(other.data);
        len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// `0x` prefixed hex of the buffer
    pub fn data(&self) -> String {
        encode_hex(&self.data)
    }
}

enum HeadEntry {
    /// Static value encoded in place
    Inline(Writer),
    /// Dynamic value living at this offset within the tail
    Pointer(usize),
}

/// Head/tail staging for one tuple level
#[derive(Default)]
pub struct HeadTailWriter {
    head: Vec<HeadEntry>,
    tail: Writer,
}

impl HeadTailWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a static value straight into the head
    pub fn write_static<F>(&mut self, encode: F) -> AbiResult<()>
    where
        F: FnOnce(&mut Writer) -> AbiResult<usize>,
    {
        let mut writer = Writer::new();
        encode(&mut writer)?;
        self.head.push(HeadEntry::Inline(writer));
        Ok(())
    }

    /// Encode a dynamic value into the tail, leaving a pointer in the head
    pub fn write_dynamic<F>(&mut self, encode: F) -> AbiResult<()>
    where
        F: FnOnce(&mut Writer) -> AbiResult<usize>,
    {
        let offset = self.tail.len();
        encode(&mut self.tail)?;
        self.head.push(HeadEntry::Pointer(offset));
        Ok(())
    }

    fn head_len(&self) -> usize {
        self.head
            .iter()
            .map(|entry| match entry {
                HeadEntry::Inline(w) => w.len(),
                HeadEntry::Pointer(_) => WORD_SIZE,
            })
            .sum()
    }

    /// Resolve pointers and append head then tail to `writer`
    ///
    /// Each pointer is the byte offset of its tail data measured from the
    /// start of this tuple's own encoding.
    pub fn finish(self, writer: &mut Writer) -> usize {
        let head_len = self.head_len();
        let mut written = 0;

        for entry in self.head {
            written += match entry {
                HeadEntry::Inline(w) => writer.append_writer(w),
                HeadEntry::Pointer(offset) => writer.write_index(head_len + offset),
            };
        }

        written + writer.append_writer(self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bytes_pads() {
        let mut writer = Writer::new();
        assert_eq!(writer.write_bytes(b"hi"), 32);
        assert_eq!(writer.len(), 32);
        assert_eq!(&writer.as_bytes()[..2], b"hi");
        assert!(writer.as_bytes()[2..].iter().all(|b| *b == 0));

        assert_eq!(writer.write_bytes(&[]), 0);
        assert_eq!(writer.write_bytes(&[1u8; 32]), 32);
        assert_eq!(writer.len(), 64);
    }

    #[test]
    fn test_write_value() {
        let mut writer = Writer::new();
        writer.write_value(U256::from(0x0102));
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
    }

    #[test]
    fn test_head_tail_pointers() {
        let mut layout = HeadTailWriter::new();
        layout.write_static(|w| Ok(w.write_index(42))).unwrap();
        layout
            .write_dynamic(|w| Ok(w.write_index(2) + w.write_bytes(b"hi")))
            .unwrap();
        layout.write_static(|w| Ok(w.write_index(7))).unwrap();

        let mut writer = Writer::new();
        let written = layout.finish(&mut writer);
        let bytes = writer.into_bytes();

        assert_eq!(written, 160);
        assert_eq!(bytes.len(), 160);
        assert_eq!(bytes[31], 42);
        // Pointer skips the three head words
        assert_eq!(bytes[63], 96);
        assert_eq!(bytes[95], 7);
        assert_eq!(bytes[127], 2);
        assert_eq!(&bytes[128..130], b"hi");
    }

    #[test]
    fn test_data_hex() {
        let mut writer = Writer::new();
        writer.write_index(1);
        assert_eq!(writer.data(), format!("0x{}01", "00".repeat(31)));
    }
}
