//! Record codec for the two ROS1 image message layouts.
//!
//! One decode path ([`read_image`]) and one encode path
//! ([`put_shrunk_image`]), symmetric field order. The field order is part of
//! the wire contract of the published schema definitions and must not be
//! reordered.

use crate::error::ShrinkError;
use crate::wire::{self, Cursor};

/// ROS1 time: seconds plus a nanoseconds remainder. Always paired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stamp {
    pub sec: i32,
    pub nsec: u32,
}

/// `std_msgs/Header`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub seq: u32,
    pub stamp: Stamp,
    pub frame_id: String,
}

impl Header {
    /// Exact serialized size: seq, stamp, length prefix, frame id bytes.
    pub fn size_in_bytes(&self) -> usize {
        4 + 8 + 4 + self.frame_id.len()
    }
}

/// Decoded `sensor_msgs/Image`.
///
/// `data`'s length comes from its own u32 prefix, which is authoritative;
/// height/width/step may disagree with it in malformed input and are
/// validated only when the pixels are actually interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    pub step: u32,
    pub data: Vec<u8>,
}

/// `foxglove_msgs/ShrunkImage`: the source image's metadata copied verbatim,
/// a compression format tag (`"webp"`, `"png"`, or `""` for passthrough),
/// and the compressed or raw payload.
///
/// height/width/encoding/step keep describing the original uncompressed
/// image, not the compressed buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShrunkImage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    pub step: u32,
    pub format: String,
    pub data: Vec<u8>,
}

impl ShrunkImage {
    /// Exact number of bytes [`put_shrunk_image`] emits. Used to pre-size
    /// output buffers, so a mismatch is a correctness bug.
    pub fn size_in_bytes(&self) -> usize {
        self.header.size_in_bytes()
            + 4 // height
            + 4 // width
            + 4 + self.encoding.len()
            + 1 // is_bigendian
            + 4 // step
            + 4 + self.format.len()
            + 4 + self.data.len()
    }
}

pub fn read_header(cur: &mut Cursor<'_>) -> Result<Header, ShrinkError> {
    let seq = cur.read_u32()?;
    let sec = cur.read_i32()?;
    let nsec = cur.read_u32()?;
    let frame_id = cur.read_string()?;
    Ok(Header {
        seq,
        stamp: Stamp { sec, nsec },
        frame_id,
    })
}

pub fn put_header(header: &Header, out: &mut Vec<u8>) {
    wire::put_u32(out, header.seq);
    wire::put_i32(out, header.stamp.sec);
    wire::put_u32(out, header.stamp.nsec);
    wire::put_string(out, &header.frame_id);
}

/// Decodes a `sensor_msgs/Image` payload.
pub fn read_image(cur: &mut Cursor<'_>) -> Result<Image, ShrinkError> {
    let header = read_header(cur)?;
    let height = cur.read_u32()?;
    let width = cur.read_u32()?;
    let encoding = cur.read_string()?;
    let is_bigendian = cur.read_u8()?;
    let step = cur.read_u32()?;
    let data = cur.read_bytes()?.to_vec();
    Ok(Image {
        header,
        height,
        width,
        encoding,
        is_bigendian,
        step,
        data,
    })
}

/// Decodes a `foxglove_msgs/ShrunkImage` payload.
pub fn read_shrunk_image(cur: &mut Cursor<'_>) -> Result<ShrunkImage, ShrinkError> {
    let header = read_header(cur)?;
    let height = cur.read_u32()?;
    let width = cur.read_u32()?;
    let encoding = cur.read_string()?;
    let is_bigendian = cur.read_u8()?;
    let step = cur.read_u32()?;
    let format = cur.read_string()?;
    let data = cur.read_bytes()?.to_vec();
    Ok(ShrunkImage {
        header,
        height,
        width,
        encoding,
        is_bigendian,
        step,
        format,
        data,
    })
}

pub fn put_shrunk_image(image: &ShrunkImage, out: &mut Vec<u8>) {
    put_header(&image.header, out);
    wire::put_u32(out, image.height);
    wire::put_u32(out, image.width);
    wire::put_string(out, &image.encoding);
    wire::put_u8(out, image.is_bigendian);
    wire::put_u32(out, image.step);
    wire::put_string(out, &image.format);
    wire::put_bytes(out, &image.data);
}

/// Serializes a `ShrunkImage` into a buffer pre-sized with
/// [`ShrunkImage::size_in_bytes`].
pub fn encode_shrunk_image(image: &ShrunkImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(image.size_in_bytes());
    put_shrunk_image(image, &mut out);
    debug_assert_eq!(out.len(), image.size_in_bytes());
    out
}
