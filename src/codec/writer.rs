use crate::error::{Error, Result};

/// Number of bytes `s` occupies as a single-byte string
pub fn latin1_len(s: &str) -> usize {
    s.chars().count()
}

/// Number of UTF-16 code units in `s`
pub fn wide_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Little-endian binary writer backed by a growable buffer
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.data.resize(self.data.len() + count, 0);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(if v { 1 } else { 0 });
    }

    pub fn write_i16_le(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, v: i64) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32_le(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    fn write_latin1(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            let b = u8::try_from(u32::from(c)).map_err(|_| {
                Error::InvalidModel(format!("character {c:?} in {s:?} does not fit in one byte"))
            })?;
            self.write_u8(b);
        }
        Ok(())
    }

    /// Write a string with a one-byte length prefix
    pub fn write_short_string(&mut self, s: &str) -> Result<()> {
        let len = latin1_len(s);
        let len = u8::try_from(len)
            .map_err(|_| Error::InvalidModel(format!("string {s:?} is longer than 255 bytes")))?;
        self.write_u8(len);
        self.write_latin1(s)
    }

    /// Write a string with a two-byte length prefix
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let len = i16::try_from(latin1_len(s))
            .map_err(|_| Error::InvalidModel(format!("string of {} bytes is too long", s.len())))?;
        self.write_i16_le(len);
        self.write_latin1(s)
    }

    /// Write a UTF-16LE string prefixed with its code unit count
    pub fn write_wide_string(&mut self, s: &str) -> Result<()> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let len = i16::try_from(units.len())
            .map_err(|_| Error::InvalidModel(format!("wide string of {} units is too long", units.len())))?;
        self.write_i16_le(len);
        for unit in units {
            self.data.extend_from_slice(&unit.to_le_bytes());
        }
        Ok(())
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BinaryWriter> for Vec<u8> {
    fn from(writer: BinaryWriter) -> Self {
        writer.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reader::BinaryReader;

    #[test]
    fn test_roundtrip_primitives() {
        let mut writer = BinaryWriter::new();
        writer.write_u8(0x42);
        writer.write_i16_le(-2);
        writer.write_i32_le(0x1234_5678);
        writer.write_i64_le(8852388021845098495);
        writer.write_f32_le(1.5);

        let data = writer.into_vec();
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_i16_le().unwrap(), -2);
        assert_eq!(reader.read_i32_le().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_i64_le().unwrap(), 8852388021845098495);
        assert_eq!(reader.read_f32_le().unwrap(), 1.5);
    }

    #[test]
    fn test_string_lengths_match_output() {
        let mut writer = BinaryWriter::new();
        writer.write_string("caf\u{e9}").unwrap();
        assert_eq!(writer.len(), 2 + latin1_len("caf\u{e9}"));

        let mut writer = BinaryWriter::new();
        writer.write_wide_string("\u{1F600}x").unwrap();
        assert_eq!(writer.len(), 2 + 2 * wide_len("\u{1F600}x"));
    }

    #[test]
    fn test_roundtrip_wide_string() {
        let mut writer = BinaryWriter::new();
        writer.write_wide_string("Spieler \u{00fc}\u{1F600}").unwrap();

        let data = writer.into_vec();
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_wide_string().unwrap(), "Spieler \u{00fc}\u{1F600}");
    }

    #[test]
    fn test_unencodable_strings_are_rejected() {
        let mut writer = BinaryWriter::new();
        assert!(matches!(writer.write_string("\u{4e16}"), Err(Error::InvalidModel(_))));
        assert!(matches!(
            writer.write_short_string(&"x".repeat(256)),
            Err(Error::InvalidModel(_))
        ));
    }
}
