//! Virtual chunk cursor.
//!
//! The same traversal runs twice: once against a counting cursor that only
//! advances a copy of the identifier allocator, then against the real
//! writer. Since both passes go through [`Cursor::chunk`], every chunk
//! consumes exactly one identifier in either mode.

use std::io::{Seek, Write};

use crate::chunk::{ChunkWriter, IdAllocator, Tag};
use crate::util::Result;

/// Chunk sink that either counts or writes.
pub enum Cursor<'w, W: Write + Seek> {
    /// Identifiers are issued, no bytes are written and bodies never run.
    Simulate(IdAllocator),
    /// Chunks are framed and written.
    Emit(&'w mut ChunkWriter<W>),
}

impl<'w, W: Write + Seek> Cursor<'w, W> {
    /// Counting cursor continuing from the writer's current identifier.
    pub fn simulate(writer: &ChunkWriter<W>) -> Self {
        Self::Simulate(*writer.ids())
    }

    pub fn emit(writer: &'w mut ChunkWriter<W>) -> Self {
        Self::Emit(writer)
    }

    #[inline]
    pub fn is_emitting(&self) -> bool {
        matches!(self, Self::Emit(_))
    }

    /// Write (or count) one chunk and return its identifier.
    pub fn chunk<F>(&mut self, tag: &Tag, version: u32, body: F) -> Result<u32>
    where
        F: FnOnce(&mut ChunkWriter<W>) -> Result<()>,
    {
        match self {
            Self::Simulate(ids) => Ok(ids.next_id()),
            Self::Emit(w) => w.chunk(tag, version, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{tags, OStream};
    use std::io::Cursor as IoCursor;

    #[test]
    fn test_simulate_matches_emit() -> Result<()> {
        let mut writer = ChunkWriter::new(OStream::new(IoCursor::new(Vec::new())))?;
        writer.chunk(tags::FILE, 1, |w| w.stream().write_u16(1))?;

        let mut sim = Cursor::simulate(&writer);
        let predicted: Vec<u32> = (0..3)
            .map(|_| sim.chunk(tags::USER, 1, |_| unreachable!()))
            .collect::<Result<_>>()?;

        let mut emit = Cursor::emit(&mut writer);
        let mut actual = Vec::new();
        for _ in 0..3 {
            actual.push(emit.chunk(tags::USER, 1, |w| w.stream().write_u32(0))?);
        }
        assert_eq!(predicted, vec![1, 2, 3]);
        assert_eq!(predicted, actual);
        Ok(())
    }

    #[test]
    fn test_simulate_writes_nothing() -> Result<()> {
        let writer = ChunkWriter::new(OStream::new(IoCursor::new(Vec::new())))?;
        let mut sim = Cursor::simulate(&writer);
        assert!(!sim.is_emitting());
        assert_eq!(sim.chunk(tags::OBJECT, 3, |_| unreachable!())?, 0);
        assert_eq!(sim.chunk(tags::OBJECT, 3, |_| unreachable!())?, 1);
        assert_eq!(writer.ids().issued(), 0);
        Ok(())
    }
}
