use super::section::{Header, Identifier, Section};
use super::{BinaryReader, StringTable};
use crate::error::{Error, Result};

/// Values that can be parsed out of a CkMp stream
pub trait Decode: Sized {
    fn decode(de: &mut Decoder<'_>) -> Result<Self>;
}

/// Per-file read state: the byte stream, its string table, and the section being parsed
pub struct Decoder<'a> {
    reader: BinaryReader<'a>,
    strings: StringTable,
    identifiers: Vec<Option<Identifier>>,
    context: &'static str,
}

impl<'a> Decoder<'a> {
    pub fn new(reader: BinaryReader<'a>, strings: StringTable) -> Self {
        // Resolve every table slot to a known identifier once, so headers
        // dispatch by index lookup instead of string comparison.
        let mut identifiers = vec![None; strings.len() + 1];
        for (index, name) in strings.iter() {
            identifiers[index as usize] = Identifier::from_name(name);
        }
        Self {
            reader,
            strings,
            identifiers,
            context: "file",
        }
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    /// Run `f` with `context` reported by any format violation it raises
    pub fn in_context<T>(
        &mut self,
        context: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let outer = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = outer;
        result
    }

    pub fn violation(&self, message: impl Into<String>) -> Error {
        self.violation_at(self.position(), message)
    }

    pub fn violation_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::FormatViolation {
            context: self.context,
            offset,
            message: message.into(),
        }
    }

    pub fn resolve(&self, index: i32) -> Result<&str> {
        self.strings.resolve(index)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.reader.read_u8()
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.reader.read_bool()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.reader.read_i16_le()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.reader.read_i32_le()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.reader.read_i64_le()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.reader.read_f32_le()
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.reader.read_bytes(n)
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.reader.read_string()
    }

    pub fn read_wide_string(&mut self) -> Result<String> {
        self.reader.read_wide_string()
    }

    /// Read an i16 string table reference and resolve it
    pub fn read_name(&mut self) -> Result<String> {
        let index = self.read_i16()?;
        Ok(self.resolve(i32::from(index))?.to_owned())
    }

    /// Read a count that must not be negative
    pub fn read_count(&mut self) -> Result<usize> {
        let offset = self.position();
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| self.violation_at(offset, format!("negative count {count}")))
    }

    pub fn expect_zeros(&mut self, count: usize) -> Result<()> {
        let offset = self.position();
        let bytes = self.reader.read_bytes(count)?;
        if let Some(i) = bytes.iter().position(|&b| b != 0) {
            return Err(self.violation_at(
                offset + i,
                format!("reserved byte is {:#04x}, expected 0", bytes[i]),
            ));
        }
        Ok(())
    }

    pub fn expect_u8(&mut self, expected: u8, what: &str) -> Result<()> {
        let offset = self.position();
        let value = self.read_u8()?;
        if value != expected {
            return Err(self.violation_at(offset, format!("{what} is {value}, expected {expected}")));
        }
        Ok(())
    }

    pub fn expect_i32(&mut self, expected: i32, what: &str) -> Result<()> {
        let offset = self.position();
        let value = self.read_i32()?;
        if value != expected {
            return Err(self.violation_at(offset, format!("{what} is {value}, expected {expected}")));
        }
        Ok(())
    }

    /// Read a section header and compute the absolute bounds of its payload
    pub fn read_section(&mut self) -> Result<Section> {
        let offset = self.position();
        let header = Header::read(&mut self.reader)?;
        self.resolve(header.index)?;
        let identifier = self.identifiers.get(header.index as usize).copied().flatten();

        let start = self.position();
        let length = usize::try_from(header.length)
            .map_err(|_| self.violation_at(offset, format!("negative section length {}", header.length)))?;
        if length > self.reader.remaining() {
            return Err(self.violation_at(
                offset,
                format!("section of {length} bytes runs past end of data"),
            ));
        }
        Ok(Section {
            header,
            identifier,
            start,
            end: start + length,
        })
    }

    /// Read a section header that must carry `expected` and one of its format tags
    pub fn expect_section(&mut self, expected: Identifier) -> Result<Section> {
        let offset = self.position();
        let section = self.read_section()?;
        if section.identifier != Some(expected) {
            let found = self.resolve(section.header.index)?.to_owned();
            return Err(self.violation_at(offset, format!("expected {expected} section, found {found:?}")));
        }
        self.check_tag(&section, offset)?;
        Ok(section)
    }

    /// Check the header's format tag against its identifier's accepted tags
    pub fn check_tag(&self, section: &Section, offset: usize) -> Result<()> {
        if let Some(id) = section.identifier {
            if !id.format_tags().contains(&section.header.tag) {
                return Err(self.violation_at(
                    offset,
                    format!("{id} has format tag {}, expected one of {:?}", section.header.tag, id.format_tags()),
                ));
            }
        }
        Ok(())
    }

    /// Whether another child element starts before the end of `section`
    pub fn has_more(&self, section: &Section) -> bool {
        self.position() < section.end
    }

    /// Fail unless exactly the section's byte length has been consumed
    pub fn finish(&self, section: &Section) -> Result<()> {
        let position = self.position();
        if position != section.end {
            return Err(self.violation_at(
                position,
                format!("section payload ends at {:#x}, parsed up to {position:#x}", section.end),
            ));
        }
        Ok(())
    }

    /// Skip the rest of a section's payload and return it
    pub fn skip_section(&mut self, section: &Section) -> Result<&'a [u8]> {
        let remaining = section.end.saturating_sub(self.position());
        self.reader.read_bytes(remaining)
    }
}
