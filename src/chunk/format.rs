//! SCN container constants and tag helpers.

/// A four-byte ASCII chunk type tag.
pub type Tag = [u8; 4];

/// Outer container signature.
pub const RIFF_MAGIC: &Tag = b"RIFF";

/// Form type written right after the root length.
pub const SCENE_FORM: &Tag = b"SCNE";

/// Chunk list header.
pub const LIST_MAGIC: &Tag = b"LIST";

/// Info sub-block header.
pub const INFO_MAGIC: &Tag = b"INFO";

/// Data sub-block header.
pub const DATA_MAGIC: &Tag = b"DATA";

/// Fixed length stored in every INFO sub-block (version + identifier).
pub const INFO_LENGTH: u32 = 8;

/// Size of the root header: `RIFF` + length + `SCNE`.
pub const ROOT_HEADER_SIZE: u64 = 12;

/// Offset of the root length field.
pub const ROOT_LENGTH_OFFSET: u64 = 4;

/// Bytes from the start of a chunk envelope to its payload.
///
/// `LIST` + len + tag + `INFO` + len + version + id + `DATA` + len.
pub const ENVELOPE_SIZE: u64 = 36;

/// Envelope bytes counted by the LIST length but not by the DATA length.
pub const ENVELOPE_OVERHEAD: u32 = 28;

/// Offset of the LIST length field relative to the envelope start.
pub const LIST_LENGTH_OFFSET: u64 = 4;

/// Offset of the DATA length field relative to the envelope start.
pub const DATA_LENGTH_OFFSET: u64 = 32;

/// Reference value meaning "no object".
///
/// Identifier 0 always belongs to the FILE chunk, so it never names a referent.
pub const NULL_REF: u32 = 0;

/// Maximum encodable string length.
pub const MAX_STRING_LEN: usize = 255;

/// Chunk type tags written by the exporter.
pub mod tags {
    use super::Tag;

    pub const FILE: &Tag = b"FILE";
    pub const SCENE: &Tag = b"SCNE";
    pub const META: &Tag = b"META";
    pub const USER: &Tag = b"USER";
    pub const ANIM: &Tag = b"ANIM";
    pub const SOUND: &Tag = b"AUDF";
    pub const SPEAKER: &Tag = b"AUDS";
    pub const LIGHT: &Tag = b"LGHT";
    pub const CAMERA: &Tag = b"CAMR";
    pub const TEXTURE: &Tag = b"TXTR";
    pub const MATERIAL: &Tag = b"MTRL";
    pub const SKELETON: &Tag = b"SKEL";
    pub const SPLINE: &Tag = b"SPLN";
    pub const CURVE: &Tag = b"CURV";
    pub const MESH: &Tag = b"MESH";
    pub const RIGID_BODY: &Tag = b"RGDB";
    pub const COLLIDER: &Tag = b"COLL";
    pub const FIXED_JOINT: &Tag = b"FJNT";
    pub const HINGE_JOINT: &Tag = b"HJNT";
    pub const SPRING_JOINT: &Tag = b"SJNT";
    pub const VERTEX_GROUP: &Tag = b"VTXG";
    pub const MODIFIER: &Tag = b"MDFR";
    pub const OBJECT: &Tag = b"OBJT";
}

/// Render a tag for logs and listings.
pub fn tag_str(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_constants_agree() {
        // LIST length covers everything after the 8-byte LIST header.
        assert_eq!(ENVELOPE_SIZE - 8, ENVELOPE_OVERHEAD as u64);
        assert_eq!(DATA_LENGTH_OFFSET + 4, ENVELOPE_SIZE);
    }
}
