//! Word-aligned reader over an ABI encoded buffer
//!
//! A reader is a `(buffer, offset)` pair. Dynamic values are decoded from a
//! sub-reader anchored at a relative offset, leaving the parent's cursor
//! where it was. A reader and all of its sub-readers share one count of
//! bytes read, bounded by a multiple of the root buffer length.

use std::cell::Cell;
use std::rc::Rc;

use ethers_core::types::U256;

use super::value::AbiValue;
use crate::config::{DEFAULT_MAX_INFLATION, WORD_SIZE};
use crate::error::{AbiError, AbiResult};

/// Hook applied to every decoded value: `(coder name, value) -> value`
pub type CoerceFn = dyn Fn(&str, AbiValue) -> AbiValue + Send + Sync;

/// Bytes read across a reader tree
#[derive(Debug)]
struct ReadBudget {
    read: Cell<usize>,
    /// `None` when unbounded
    limit: Option<usize>,
    root_len: usize,
    max_inflation: usize,
}

impl ReadBudget {
    fn new(root_len: usize, max_inflation: usize) -> Rc<Self> {
        let limit = match max_inflation {
            0 => None,
            ratio => Some(root_len.saturating_mul(ratio)),
        };
        Rc::new(Self {
            read: Cell::new(0),
            limit,
            root_len,
            max_inflation,
        })
    }

    fn charge(&self, count: usize) -> AbiResult<()> {
        let read = self.read.get().saturating_add(count);
        self.read.set(read);
        match self.limit {
            Some(limit) if read > limit => Err(AbiError::malformed(
                "data",
                format!("data exceeds inflation ratio of {}", self.max_inflation),
                self.root_len,
                read,
            )),
            _ => Ok(()),
        }
    }
}

/// Decode-time cursor
#[derive(Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
    allow_loose: bool,
    coerce: Option<&'a CoerceFn>,
    budget: Rc<ReadBudget>,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], allow_loose: bool, coerce: Option<&'a CoerceFn>) -> Self {
        Self {
            data,
            offset: 0,
            allow_loose,
            coerce,
            budget: ReadBudget::new(data.len(), DEFAULT_MAX_INFLATION),
        }
    }

    /// Replace the read budget: at most `ratio` bytes read per input byte,
    /// unbounded when `ratio` is 0
    pub fn with_max_inflation(mut self, ratio: usize) -> Self {
        self.budget = ReadBudget::new(self.data.len(), ratio);
        self
    }

    /// The whole buffer this reader views
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes consumed so far by this cursor
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Bytes read by this reader and every reader sharing its budget
    pub fn total_read(&self) -> usize {
        self.budget.read.get()
    }

    pub fn allow_loose(&self) -> bool {
        self.allow_loose
    }

    /// Pass a decoded value through the caller's hook, if any
    pub fn coerce(&self, name: &str, value: AbiValue) -> AbiValue {
        match self.coerce {
            Some(f) => f(name, value),
            None => value,
        }
    }

    /// Reader anchored `offset` bytes past this reader's cursor
    pub fn sub_reader(&self, offset: usize) -> AbiResult<Reader<'a>> {
        let start = self
            .offset
            .checked_add(offset)
            .filter(|start| *start <= self.data.len())
            .ok_or_else(|| {
                AbiError::malformed("offset", "data out-of-bounds", self.data.len(), self.offset.saturating_add(offset))
            })?;

        Ok(Reader {
            data: &self.data[start..],
            offset: 0,
            allow_loose: self.allow_loose,
            coerce: self.coerce,
            budget: Rc::clone(&self.budget),
        })
    }

    fn peek_bytes(&self, length: usize, loose: bool) -> AbiResult<&'a [u8]> {
        let mut aligned = length
            .checked_add(WORD_SIZE - 1)
            .map(|l| l / WORD_SIZE * WORD_SIZE)
            .ok_or_else(|| AbiError::malformed("bytes", "data out-of-bounds", self.data.len(), usize::MAX))?;

        let end = self.offset.saturating_add(aligned);
        if end > self.data.len() {
            let exact = self.offset.saturating_add(length);
            if self.allow_loose && loose && exact <= self.data.len() {
                aligned = length;
            } else {
                return Err(AbiError::malformed("bytes", "data out-of-bounds", self.data.len(), end));
            }
        }

        Ok(&self.data[self.offset..self.offset + aligned])
    }

    /// Consume `length` bytes rounded up to a whole number of words
    ///
    /// With `loose` set on a reader that allows it, the final payload may
    /// stop short of its word padding.
    pub fn read_bytes(&mut self, length: usize, loose: bool) -> AbiResult<&'a [u8]> {
        let bytes = self.peek_bytes(length, loose)?;
        self.budget.charge(bytes.len())?;
        self.offset += bytes.len();
        Ok(&bytes[..length])
    }

    /// Consume one word
    pub fn read_word(&mut self) -> AbiResult<[u8; WORD_SIZE]> {
        let bytes = self.read_bytes(WORD_SIZE, false)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(bytes);
        Ok(word)
    }

    /// Consume one word as a big-endian unsigned integer
    pub fn read_value(&mut self) -> AbiResult<U256> {
        Ok(U256::from_big_endian(&self.read_word()?))
    }

    /// Consume one word as a length or offset that must fit in memory
    pub fn read_index(&mut self, type_name: &str) -> AbiResult<usize> {
        let at = self.offset;
        let value = self.read_value()?;
        if value.bits() > 64 {
            return Err(AbiError::malformed(type_name, "offset or length overflow", self.data.len(), at));
        }
        usize::try_from(value.low_u64())
            .map_err(|_| AbiError::malformed(type_name, "offset or length overflow", self.data.len(), at))
    }
}
