use super::*;
use crate::util::Result;
use std::io::Cursor;

fn writer() -> Result<ChunkWriter<Cursor<Vec<u8>>>> {
    ChunkWriter::new(OStream::new(Cursor::new(Vec::new())))
}

fn finish(w: ChunkWriter<Cursor<Vec<u8>>>) -> Result<Vec<u8>> {
    Ok(w.finish()?.into_inner()?.into_inner())
}

#[test]
fn test_empty_container() -> Result<()> {
    let bytes = finish(writer()?)?;
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 4);
    assert_eq!(&bytes[8..12], b"SCNE");

    let reader = ChunkReader::new(&bytes)?;
    assert!(reader.chunks()?.is_empty());
    Ok(())
}

#[test]
fn test_single_chunk_layout() -> Result<()> {
    let mut w = writer()?;
    let id = w.chunk(tags::FILE, 1, |w| w.stream().write_u16(1))?;
    assert_eq!(id, 0);
    let bytes = finish(w)?;

    // 12 root + 36 envelope + 2 payload
    assert_eq!(bytes.len(), 50);
    let reader = ChunkReader::new(&bytes)?;
    let chunks = reader.chunks()?;
    assert_eq!(chunks.len(), 1);
    let c = &chunks[0];
    assert_eq!(&c.tag, b"FILE");
    assert_eq!(c.version, 1);
    assert_eq!(c.id, 0);
    assert_eq!(c.list_len, 30);
    assert_eq!(c.data_len, 2);
    assert_eq!(reader.payload(c), &[1, 0]);
    Ok(())
}

#[test]
fn test_nested_chunks_patch_both_levels() -> Result<()> {
    let mut w = writer()?;
    let outer = w.begin(tags::SPLINE, 2)?;
    w.stream().write_u32(2)?;
    let a = w.chunk(tags::CURVE, 1, |w| w.stream().write_f32(1.0))?;
    let b = w.chunk(tags::CURVE, 1, |w| w.stream().write_string("abc"))?;
    let outer_id = w.end(outer)?;
    w.chunk(tags::FILE, 1, |_| Ok(()))?;
    let bytes = finish(w)?;

    assert_eq!((outer_id, a, b), (0, 1, 2));

    let reader = ChunkReader::new(&bytes)?;
    let top = reader.chunks()?;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].data_len as usize, 4 + (36 + 4) + (36 + 4));
    assert_eq!(top[1].id, 3);

    let children = reader.children(&top[0], 4)?;
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].data_len, 4);
    assert_eq!(children[1].data_len, 4);
    assert_eq!(children[1].id, 2);
    Ok(())
}

#[test]
fn test_ids_are_dense() -> Result<()> {
    let mut w = writer()?;
    for i in 0..10u32 {
        let id = w.chunk(tags::META, 1, |w| w.stream().write_u32(i))?;
        assert_eq!(id, i);
    }
    assert_eq!(w.ids().issued(), 10);
    let bytes = finish(w)?;
    let ids: Vec<u32> = ChunkReader::new(&bytes)?.chunks()?.iter().map(|c| c.id).collect();
    assert_eq!(ids, (0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_begin_rejects_non_ascii_tag() -> Result<()> {
    let mut w = writer()?;
    assert!(matches!(w.begin(&[0xC3, 0x89, b'A', b'B'], 1), Err(crate::Error::InvalidTag(_))));
    Ok(())
}

#[test]
fn test_reader_rejects_bad_root_length() -> Result<()> {
    let mut bytes = finish(writer()?)?;
    bytes.push(0);
    assert!(ChunkReader::new(&bytes).is_err());
    Ok(())
}

#[test]
fn test_payload_reader_strings() -> Result<()> {
    let mut w = writer()?;
    w.chunk(tags::META, 1, |w| {
        w.stream().write_string("ab")?;
        w.stream().write_string("abc")?;
        w.stream().write_u32(42)
    })?;
    let bytes = finish(w)?;
    let reader = ChunkReader::new(&bytes)?;
    let chunk = reader.chunks()?[0];
    let mut p = reader.payload_reader(&chunk);
    assert_eq!(p.read_string()?, "ab");
    assert_eq!(p.read_string()?, "abc");
    assert_eq!(p.read_u32()?, 42);
    Ok(())
}
