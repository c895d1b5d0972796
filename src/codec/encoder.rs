use super::section::{Header, Identifier};
use super::{BinaryWriter, StringTable};
use crate::error::{Error, Result};

/// Values that can be written into a CkMp stream
pub trait Encode {
    /// Exact number of bytes `encode` emits
    fn encoded_len(&self) -> usize;

    fn encode(&self, en: &mut Encoder) -> Result<()>;
}

/// Per-file write state: the staging buffer and the string table it references
pub struct Encoder {
    writer: BinaryWriter,
    strings: StringTable,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            writer: BinaryWriter::with_capacity(64 * 1024),
            strings: StringTable::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Split into the finished string table and the staged body
    pub fn finish(self) -> (StringTable, Vec<u8>) {
        (self.strings, self.writer.into_vec())
    }

    pub fn intern(&mut self, s: &str) -> i32 {
        self.strings.intern(s)
    }

    pub fn write_u8(&mut self, v: u8) {
        self.writer.write_u8(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.writer.write_bool(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.writer.write_i16_le(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.writer.write_i32_le(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.writer.write_i64_le(v);
    }

    pub fn write_f32(&mut self, v: f32) {
        self.writer.write_f32_le(v);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.writer.write_bytes(bytes);
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.writer.write_zeros(count);
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.writer.write_string(s)
    }

    pub fn write_wide_string(&mut self, s: &str) -> Result<()> {
        self.writer.write_wide_string(s)
    }

    /// Intern `name` and write its index as an i16
    pub fn write_name(&mut self, name: &str) -> Result<()> {
        let index = self.intern(name);
        let index = i16::try_from(index)
            .map_err(|_| Error::InvalidModel(format!("string index {index} for {name:?} exceeds i16")))?;
        self.write_i16(index);
        Ok(())
    }

    /// Write a count as i32
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| Error::InvalidModel(format!("count {count} exceeds i32")))?;
        self.write_i32(count);
        Ok(())
    }

    /// Write a framed section whose payload is `payload_len` bytes long.
    ///
    /// The header is emitted before `body` runs, so `payload_len` must be computed
    /// up front; a body that writes any other number of bytes is a codec defect.
    pub fn write_section(
        &mut self,
        identifier: Identifier,
        tag: i16,
        payload_len: usize,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let length = i32::try_from(payload_len)
            .map_err(|_| Error::InvalidModel(format!("{identifier} payload of {payload_len} bytes exceeds i32")))?;
        let header = Header {
            index: self.intern(identifier.as_str()),
            tag,
            length,
        };
        header.write(&mut self.writer);

        let start = self.len();
        body(self)?;
        let actual = self.len() - start;
        if actual != payload_len {
            return Err(Error::SizeInvariant {
                entity: identifier.as_str(),
                declared: payload_len,
                actual,
            });
        }
        Ok(())
    }

    /// Encode `value`, checking that it emits exactly `encoded_len` bytes
    pub fn write_value<T: Encode>(&mut self, entity: &'static str, value: &T) -> Result<()> {
        let declared = value.encoded_len();
        let start = self.len();
        value.encode(self)?;
        let actual = self.len() - start;
        if actual != declared {
            return Err(Error::SizeInvariant { entity, declared, actual });
        }
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
