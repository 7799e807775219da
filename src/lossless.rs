//! Thin adapters over the lossless pixel encoders.
//!
//! Inputs are tightly packed rows; row repacking and channel-order
//! normalization happen in [`crate::shrink`] before these are called.

use crate::error::ShrinkError;

/// WebP-lossless encode of packed RGB (`alpha = false`) or RGBA
/// (`alpha = true`) pixels.
pub(crate) fn webp_lossless(
    pixels: &[u8],
    width: u32,
    height: u32,
    alpha: bool,
) -> Result<Vec<u8>, ShrinkError> {
    let encoder = if alpha {
        webp::Encoder::from_rgba(pixels, width, height)
    } else {
        webp::Encoder::from_rgb(pixels, width, height)
    };
    let memory = encoder
        .encode_simple(true, 100.0)
        .map_err(|e| ShrinkError::Encode {
            format: "webp",
            reason: format!("{e:?}"),
        })?;
    Ok(memory.to_vec())
}

/// PNG encode of packed 16-bit grayscale rows.
///
/// Sample bytes are written through verbatim, so callers must supply them in
/// the big-endian order PNG stores.
pub(crate) fn png_gray16(rows: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ShrinkError> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Sixteen);

    let mut writer = encoder.write_header().map_err(png_error)?;
    writer.write_image_data(rows).map_err(png_error)?;
    writer.finish().map_err(png_error)?;
    Ok(out)
}

fn png_error(e: png::EncodingError) -> ShrinkError {
    ShrinkError::Encode {
        format: "png",
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webp_output_is_riff_container() {
        let pixels = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 10, 10, 10];
        let encoded = webp_lossless(&pixels, 2, 2, false).unwrap();
        assert_eq!(&encoded[..4], b"RIFF");
        assert_eq!(&encoded[8..12], b"WEBP");
    }

    #[test]
    fn webp_rejects_zero_dimensions() {
        assert!(matches!(
            webp_lossless(&[], 0, 0, false),
            Err(ShrinkError::Encode { format: "webp", .. })
        ));
    }

    #[test]
    fn png_output_has_signature() {
        let rows = [0x01u8, 0x00, 0x80, 0xff, 0x00, 0x10, 0xab, 0xcd];
        let encoded = png_gray16(&rows, 2, 2).unwrap();
        assert_eq!(&encoded[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn png_rejects_short_buffer() {
        assert!(matches!(
            png_gray16(&[0u8; 3], 2, 2),
            Err(ShrinkError::Encode { format: "png", .. })
        ));
    }
}
