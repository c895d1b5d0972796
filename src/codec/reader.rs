use crate::error::{Error, Result};

/// Little-endian binary reader over an in-memory CkMp file
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof { offset: self.pos });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `len` single-byte characters (bytes map 1:1 to Latin-1 chars)
    pub fn read_latin1(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// Read a string with a one-byte length prefix
    pub fn read_short_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        self.read_latin1(len)
    }

    /// Read a string with a two-byte length prefix
    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_i16_le()?;
        let len = usize::try_from(len).map_err(|_| Error::FormatViolation {
            context: "string",
            offset,
            message: format!("negative string length {len}"),
        })?;
        self.read_latin1(len)
    }

    /// Read a UTF-16LE string whose two-byte prefix counts code units
    pub fn read_wide_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let units = self.read_i16_le()?;
        let units = usize::try_from(units).map_err(|_| Error::FormatViolation {
            context: "wide string",
            offset,
            message: format!("negative string length {units}"),
        })?;
        let bytes = self.read_bytes(units * 2)?;
        let wide: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&wide).map_err(|_| Error::FormatViolation {
            context: "wide string",
            offset,
            message: "invalid UTF-16".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_i16_le().unwrap(), 0x0302);
        assert_eq!(reader.read_i32_le().unwrap(), 0x07060504);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_past_end_reports_offset() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);
        reader.read_u8().unwrap();
        match reader.read_i32_le() {
            Err(Error::UnexpectedEof { offset }) => assert_eq!(offset, 1),
            other => panic!("expected eof, got {other:?}"),
        }
    }

    #[test]
    fn test_read_strings() {
        let data = [0x02, b'h', b'i', 0x03, 0x00, b'a', b'b', b'c', 0x01, 0x00, 0xE9, 0x00];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_short_string().unwrap(), "hi");
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.read_wide_string().unwrap(), "\u{e9}");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_negative_string_length_is_rejected() {
        let data = [0xFF, 0xFF];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(reader.read_string(), Err(Error::FormatViolation { .. })));
    }
}
