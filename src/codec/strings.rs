//! String interning table
//!
//! Every structural identifier ("HeightMapData", "Script", property names, ...) is
//! stored once at the top of the file and referenced by index everywhere else.
//! Index 0 is a null sentinel and never resolves.
//!
//! Serialized form:
//!   count: i32
//!   count entries, highest index first: { name: u8-length string, index: i32 }

use ahash::AHashMap;

use super::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct StringTable {
    entries: Vec<Option<String>>,
    lookup: AHashMap<String, i32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            entries: vec![None],
            lookup: AHashMap::new(),
        }
    }

    /// Number of strings, not counting the null sentinel
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the index of `s`, allocating the next free index on first sight
    pub fn intern(&mut self, s: &str) -> i32 {
        if let Some(&index) = self.lookup.get(s) {
            return index;
        }
        let index = self.entries.len() as i32;
        self.entries.push(Some(s.to_owned()));
        self.lookup.insert(s.to_owned(), index);
        index
    }

    pub fn resolve(&self, index: i32) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i > 0)
            .and_then(|i| self.entries.get(i))
            .and_then(|entry| entry.as_deref())
            .ok_or(Error::InvalidIndex(index))
    }

    /// Iterate `(index, string)` pairs in ascending index order, skipping unfilled slots
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_deref().map(|s| (i as i32, s)))
    }

    pub fn encoded_len(&self) -> usize {
        4 + self.entries[1..]
            .iter()
            .map(|entry| 1 + super::writer::latin1_len(entry.as_deref().unwrap_or_default()) + 4)
            .sum::<usize>()
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let offset = reader.position();
        let count = reader.read_i32_le()?;
        let count = usize::try_from(count).map_err(|_| Error::FormatViolation {
            context: "StringTable",
            offset,
            message: format!("negative string count {count}"),
        })?;

        let mut table = Self {
            entries: vec![None; count + 1],
            lookup: AHashMap::with_capacity(count),
        };
        for _ in 0..count {
            let s = reader.read_short_string()?;
            let offset = reader.position();
            let index = reader.read_i32_le()?;
            let slot = usize::try_from(index)
                .ok()
                .filter(|&i| i >= 1 && i <= count)
                .ok_or_else(|| Error::FormatViolation {
                    context: "StringTable",
                    offset,
                    message: format!("index {index} outside 1..={count}"),
                })?;
            table.lookup.insert(s.clone(), index);
            table.entries[slot] = Some(s);
        }
        Ok(table)
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_i32_le(self.len() as i32);
        for index in (1..self.entries.len()).rev() {
            let s = self.entries[index].as_deref().unwrap_or_default();
            writer.write_short_string(s)?;
            writer.write_i32_le(index as i32);
        }
        Ok(())
    }
}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.intern("HeightMapData");
        let b = table.intern("BlendTileData");
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(table.intern("HeightMapData"), a);
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(a).unwrap(), "HeightMapData");
        assert_eq!(table.resolve(b).unwrap(), "BlendTileData");
    }

    #[test]
    fn test_resolve_rejects_sentinel_and_out_of_range() {
        let mut table = StringTable::new();
        table.intern("Script");
        assert!(matches!(table.resolve(0), Err(Error::InvalidIndex(0))));
        assert!(matches!(table.resolve(2), Err(Error::InvalidIndex(2))));
        assert!(matches!(table.resolve(-1), Err(Error::InvalidIndex(-1))));
    }

    #[test]
    fn test_written_in_descending_order() {
        let mut table = StringTable::new();
        table.intern("a");
        table.intern("bc");

        let mut writer = BinaryWriter::new();
        table.write(&mut writer).unwrap();
        assert_eq!(writer.len(), table.encoded_len());
        assert_eq!(
            writer.as_slice(),
            &[2, 0, 0, 0, 2, b'b', b'c', 2, 0, 0, 0, 1, b'a', 1, 0, 0, 0]
        );

        let data = writer.into_vec();
        let read = StringTable::read(&mut BinaryReader::new(&data)).unwrap();
        assert_eq!(read.resolve(1).unwrap(), "a");
        assert_eq!(read.resolve(2).unwrap(), "bc");
    }

    #[test]
    fn test_read_fills_by_explicit_index() {
        let data = [3, 0, 0, 0, 1, b'x', 2, 0, 0, 0, 1, b'y', 3, 0, 0, 0, 1, b'z', 1, 0, 0, 0];
        let table = StringTable::read(&mut BinaryReader::new(&data)).unwrap();
        assert_eq!(table.resolve(1).unwrap(), "z");
        assert_eq!(table.resolve(2).unwrap(), "x");
        assert_eq!(table.resolve(3).unwrap(), "y");
    }

    #[test]
    fn test_read_rejects_index_outside_count() {
        let data = [1, 0, 0, 0, 1, b'x', 5, 0, 0, 0];
        let err = StringTable::read(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::FormatViolation { context: "StringTable", .. }));
    }

    #[test]
    fn test_unfilled_slot_does_not_resolve() {
        let data = [2, 0, 0, 0, 1, b'x', 2, 0, 0, 0, 1, b'y', 2, 0, 0, 0];
        let table = StringTable::read(&mut BinaryReader::new(&data)).unwrap();
        assert_eq!(table.resolve(2).unwrap(), "y");
        assert!(matches!(table.resolve(1), Err(Error::InvalidIndex(1))));
    }
}
