//! SCN output stream.
//!
//! Little-endian primitive writes over any seekable sink. Length fields are
//! patched in place with seek-write-seek, so append-only sinks are not
//! supported.

use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::format::{Tag, MAX_STRING_LEN};
use crate::util::{Error, Result, Vec2, Vec3, Vec4};

/// Total encoded size of a string of `len` bytes (prefix + bytes + parity pad).
#[inline]
pub const fn encoded_string_len(len: usize) -> usize {
    1 + len + if len % 2 == 0 { 1 } else { 0 }
}

/// Output stream for writing SCN data.
pub struct OStream<W: Write + Seek> {
    writer: W,
    pos: u64,
}

impl<W: Write + Seek> OStream<W> {
    /// Wrap a seekable sink positioned at its start.
    pub fn new(writer: W) -> Self {
        Self { writer, pos: 0 }
    }

    /// Wrap a sink that must be empty.
    ///
    /// Bytes already in the sink would survive past the end of the
    /// container and break its root length, so they are rejected.
    pub fn new_empty(mut writer: W) -> Result<Self> {
        let len = writer.seek(SeekFrom::End(0))?;
        if len != 0 {
            return Err(Error::invalid(format!("output sink already holds {} bytes", len)));
        }
        Ok(Self::new(writer))
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a four-byte tag.
    pub fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        self.write_bytes(tag)
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write a u16 value (little-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    /// Write an i16 value (little-endian).
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.writer.write_i16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    /// Write an i32 value (little-endian).
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.writer.write_i32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write an f32 value (little-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        self.pos += 4;
        Ok(())
    }

    /// Write a boolean as a u16 flag.
    pub fn write_flag(&mut self, value: bool) -> Result<()> {
        self.write_u16(u16::from(value))
    }

    pub fn write_vec2(&mut self, v: Vec2) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)
    }

    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    pub fn write_vec4(&mut self, v: Vec4) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)?;
        self.write_f32(v.w)
    }

    /// Write an RGB color with alpha forced to 1.0.
    pub fn write_rgb_opaque(&mut self, rgb: Vec3) -> Result<()> {
        self.write_vec4(rgb.extend(1.0))
    }

    /// Write a length-prefixed ASCII string.
    ///
    /// A zero pad byte follows whenever the length is even, so the encoded
    /// size is always `1 + len + (len % 2 == 0) as usize`.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        if !s.is_ascii() {
            return Err(Error::InvalidString { value: s.to_string(), reason: "not ASCII" });
        }
        if s.len() > MAX_STRING_LEN {
            return Err(Error::InvalidString {
                value: s.to_string(),
                reason: "longer than 255 bytes",
            });
        }
        self.write_u8(s.len() as u8)?;
        self.write_bytes(s.as_bytes())?;
        if s.len() % 2 == 0 {
            self.write_u8(0)?;
        }
        Ok(())
    }

    /// Write an index at the given width. Compact indices must fit in 16 bits.
    pub fn write_index(&mut self, value: u32, wide: bool) -> Result<()> {
        if wide {
            self.write_u32(value)
        } else {
            let value = u16::try_from(value)
                .map_err(|_| Error::invalid(format!("index {} does not fit 16 bits", value)))?;
            self.write_u16(value)
        }
    }

    /// Overwrite a u32 at `at`, then return to the current write position.
    pub fn patch_u32(&mut self, at: u64, value: u32) -> Result<()> {
        let resume = self.pos;
        self.seek(at)?;
        self.write_u32(value)?;
        self.seek(resume)?;
        Ok(())
    }

    /// Seek to a position and return the current position.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        self.writer.flush()?;
        let new_pos = self.writer.seek(SeekFrom::Start(pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    /// Flush the buffer to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream() -> OStream<Cursor<Vec<u8>>> {
        OStream::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_string_padding() -> Result<()> {
        let mut s = stream();
        s.write_string("abc")?;
        s.write_string("ab")?;
        s.write_string("")?;
        let bytes = s.into_inner()?.into_inner();
        assert_eq!(bytes, vec![3, b'a', b'b', b'c', 2, b'a', b'b', 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_string_length_formula() -> Result<()> {
        for len in [0usize, 1, 2, 7, 8, 254, 255] {
            let mut s = stream();
            s.write_string(&"x".repeat(len))?;
            assert_eq!(s.pos() as usize, encoded_string_len(len), "len {len}");
        }
        Ok(())
    }

    #[test]
    fn test_string_rejects_invalid() {
        let mut s = stream();
        assert!(matches!(s.write_string(&"x".repeat(256)), Err(Error::InvalidString { .. })));
        assert!(matches!(s.write_string("naïve"), Err(Error::InvalidString { .. })));
    }

    #[test]
    fn test_patch_restores_end() -> Result<()> {
        let mut s = stream();
        s.write_u32(0)?;
        s.write_u16(0xBEEF)?;
        s.patch_u32(0, 0xDEAD_BEEF)?;
        assert_eq!(s.pos(), 6);
        s.write_u8(7)?;
        let bytes = s.into_inner()?.into_inner();
        assert_eq!(bytes, vec![0xEF, 0xBE, 0xAD, 0xDE, 0xEF, 0xBE, 7]);
        Ok(())
    }

    #[test]
    fn test_patch_resumes_before_stale_tail() -> Result<()> {
        let mut s = OStream::new(Cursor::new(vec![0xAA; 16]));
        s.write_u32(0)?;
        s.write_u16(0x1234)?;
        s.patch_u32(0, 6)?;
        assert_eq!(s.pos(), 6);
        s.write_u8(9)?;
        let bytes = s.into_inner()?.into_inner();
        assert_eq!(&bytes[..7], &[6, 0, 0, 0, 0x34, 0x12, 9]);
        assert_eq!(bytes[7], 0xAA);
        Ok(())
    }

    #[test]
    fn test_new_empty_rejects_stale_bytes() -> Result<()> {
        assert!(matches!(
            OStream::new_empty(Cursor::new(vec![0xAA; 4096])),
            Err(Error::InvalidStructure(_))
        ));
        let s = OStream::new_empty(Cursor::new(Vec::new()))?;
        assert_eq!(s.pos(), 0);
        Ok(())
    }

    #[test]
    fn test_index_width() -> Result<()> {
        let mut s = stream();
        s.write_index(5, false)?;
        assert_eq!(s.pos(), 2);
        s.write_index(70000, true)?;
        assert_eq!(s.pos(), 6);
        assert!(matches!(s.write_index(70000, false), Err(Error::InvalidStructure(_))));
        assert_eq!(s.pos(), 6);
        Ok(())
    }
}
