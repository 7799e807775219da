//! Pixel-layout dispatch: normalizes raw image rows per their declared
//! encoding tag and hands them to a lossless encoder.
//!
//! Row addressing always uses the record's declared `step`, never
//! `width * bytes_per_pixel`; the two differ for padded rows. Encodings the
//! dispatch table does not know pass through unmodified with an empty
//! format tag.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::error::ShrinkError;
use crate::lossless;
use crate::record::{Image, ShrunkImage};

/// Collects one-time warnings about encodings that pass through unmodified.
///
/// Owned by the pipeline and injected into the dispatch per run, so each
/// transcode (and each test) starts with a fresh set.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warned: HashSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct encodings warned about so far.
    pub fn warned_count(&self) -> usize {
        self.warned.len()
    }

    fn warn_unhandled(&mut self, encoding: &str) {
        if self.warned.insert(encoding.to_string()) {
            log::warn!("image encoding \"{encoding}\" will not be compressed");
        }
    }
}

/// Compresses one decoded image into a [`ShrunkImage`].
///
/// The metadata fields are copied verbatim from the source record.
/// Unrecognized encodings keep their raw pixel bytes and an empty format
/// tag; encoder failures are fatal and propagate as errors.
pub fn shrink_image(
    image: &Image,
    diagnostics: &mut Diagnostics,
) -> Result<ShrunkImage, ShrinkError> {
    let (format, data) = match image.encoding.as_str() {
        "mono8" | "8UC1" => ("webp", compress_mono8(image)?),
        "mono16" => ("png", compress_mono16(image)?),
        "rgb8" | "8UC3" => ("webp", compress_color(image, 3, false)?),
        "bgr8" => ("webp", compress_color(image, 3, true)?),
        "rgba8" | "8UC4" => ("webp", compress_color(image, 4, false)?),
        "bgra8" => ("webp", compress_color(image, 4, true)?),
        _ => {
            diagnostics.warn_unhandled(&image.encoding);
            ("", image.data.clone())
        }
    };

    Ok(ShrunkImage {
        header: image.header.clone(),
        height: image.height,
        width: image.width,
        encoding: image.encoding.clone(),
        is_bigendian: image.is_bigendian,
        step: image.step,
        format: format.into(),
        data,
    })
}

/// Grayscale bytes become RGB triplets (gray,gray,gray), then WebP.
fn compress_mono8(image: &Image) -> Result<Vec<u8>, ShrinkError> {
    check_geometry(image, 1)?;
    let rgb = expand_gray_rows(
        &image.data,
        image.width as usize,
        image.height as usize,
        image.step as usize,
    );
    lossless::webp_lossless(&rgb, image.width, image.height, false)
}

/// 16-bit grayscale rows go to PNG, sample bytes untouched.
fn compress_mono16(image: &Image) -> Result<Vec<u8>, ShrinkError> {
    check_geometry(image, 2)?;
    let row_bytes = image.width as usize * 2;
    let rows = tight_rows(
        &image.data,
        row_bytes,
        image.height as usize,
        image.step as usize,
    );
    lossless::png_gray16(&rows, image.width, image.height)
}

/// 3- or 4-channel 8-bit pixels go to WebP; `swap` flips B and R first
/// (bgr8/bgra8 sources).
fn compress_color(
    image: &Image,
    bytes_per_pixel: usize,
    swap: bool,
) -> Result<Vec<u8>, ShrinkError> {
    check_geometry(image, bytes_per_pixel)?;
    let row_bytes = image.width as usize * bytes_per_pixel;
    let mut pixels = tight_rows(
        &image.data,
        row_bytes,
        image.height as usize,
        image.step as usize,
    );
    if swap {
        pixels = Cow::Owned(swap_red_blue(&pixels, bytes_per_pixel));
    }
    lossless::webp_lossless(&pixels, image.width, image.height, bytes_per_pixel == 4)
}

/// Fails unless the declared geometry fits inside the pixel buffer.
///
/// The buffer length is authoritative (it came from the record's own length
/// prefix); height/width/step are only claims until checked here. All
/// arithmetic is overflow-checked.
fn check_geometry(image: &Image, bytes_per_pixel: usize) -> Result<(), ShrinkError> {
    let h = image.height as usize;
    let needed = if h == 0 {
        Some(0)
    } else {
        (image.width as usize).checked_mul(bytes_per_pixel).and_then(|row| {
            (h - 1)
                .checked_mul(image.step as usize)
                .and_then(|rows| rows.checked_add(row))
        })
    };
    match needed {
        Some(n) if n <= image.data.len() => Ok(()),
        _ => Err(ShrinkError::ImageGeometry {
            encoding: image.encoding.clone(),
            width: image.width,
            height: image.height,
            step: image.step,
            available: image.data.len(),
        }),
    }
}

/// Expands step-addressed grayscale rows into a tight RGB buffer, one
/// (gray,gray,gray) triplet per pixel.
fn expand_gray_rows(data: &[u8], width: usize, height: usize, step: usize) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        let line = &data[row * step..row * step + width];
        for &gray in line {
            rgb.extend_from_slice(&[gray, gray, gray]);
        }
    }
    rgb
}

/// Repacks step-addressed rows into a tight buffer. Borrows when the step
/// already equals the row length.
fn tight_rows(data: &[u8], row_bytes: usize, height: usize, step: usize) -> Cow<'_, [u8]> {
    if step == row_bytes {
        return Cow::Borrowed(&data[..row_bytes * height]);
    }
    let mut out = Vec::with_capacity(row_bytes * height);
    for row in 0..height {
        out.extend_from_slice(&data[row * step..row * step + row_bytes]);
    }
    Cow::Owned(out)
}

/// Swaps B and R within each pixel (bgr→rgb, bgra→rgba) in a fresh buffer.
fn swap_red_blue(pixels: &[u8], bytes_per_pixel: usize) -> Vec<u8> {
    let mut out = pixels.to_vec();
    for pixel in out.chunks_exact_mut(bytes_per_pixel) {
        pixel.swap(0, 2);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Header;

    fn image(encoding: &str, width: u32, height: u32, step: u32, data: Vec<u8>) -> Image {
        Image {
            header: Header::default(),
            height,
            width,
            encoding: encoding.into(),
            is_bigendian: 0,
            step,
            data,
        }
    }

    #[test]
    fn mono8_normalization_expands_gray_to_rgb() {
        let expanded = expand_gray_rows(&[10, 20], 2, 1, 2);
        assert_eq!(expanded, [10, 10, 10, 20, 20, 20]);
    }

    #[test]
    fn mono8_normalization_skips_row_padding() {
        // width 2, step 4: the two trailing bytes of each row are padding.
        let data = [1, 2, 0xee, 0xee, 3, 4, 0xee, 0xee];
        let expanded = expand_gray_rows(&data, 2, 2, 4);
        assert_eq!(expanded, [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn tight_rows_borrows_when_unpadded() {
        let data = [1u8, 2, 3, 4, 5, 6];
        assert!(matches!(tight_rows(&data, 3, 2, 3), Cow::Borrowed(_)));
    }

    #[test]
    fn tight_rows_repacks_padded_rows() {
        let data = [1u8, 2, 3, 0xee, 4, 5, 6, 0xee];
        let packed = tight_rows(&data, 3, 2, 4);
        assert_eq!(packed.as_ref(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn swap_red_blue_flips_first_and_third_channel() {
        assert_eq!(swap_red_blue(&[1, 2, 3, 4, 5, 6], 3), [3, 2, 1, 6, 5, 4]);
        assert_eq!(swap_red_blue(&[1, 2, 3, 9], 4), [3, 2, 1, 9]);
    }

    #[test]
    fn mono8_shrinks_to_webp() {
        let img = image("mono8", 2, 2, 2, vec![0, 64, 128, 255]);
        let shrunk = shrink_image(&img, &mut Diagnostics::new()).unwrap();
        assert_eq!(shrunk.format, "webp");
        assert_eq!(&shrunk.data[..4], b"RIFF");
        // Metadata copied verbatim, still describing the raw image.
        assert_eq!(shrunk.encoding, "mono8");
        assert_eq!(shrunk.step, 2);
    }

    #[test]
    fn mono16_shrinks_to_png_using_declared_step() {
        // width 1 (2 bytes per row), step 4: rows are padded.
        let img = image("mono16", 1, 2, 4, vec![0xab, 0xcd, 0xee, 0xee, 0x12, 0x34, 0xee, 0xee]);
        let shrunk = shrink_image(&img, &mut Diagnostics::new()).unwrap();
        assert_eq!(shrunk.format, "png");
        assert_eq!(&shrunk.data[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rgb8_shrinks_to_webp() {
        let img = image("rgb8", 2, 1, 6, vec![255, 0, 0, 0, 0, 255]);
        let shrunk = shrink_image(&img, &mut Diagnostics::new()).unwrap();
        assert_eq!(shrunk.format, "webp");
    }

    #[test]
    fn bgra8_shrinks_to_webp() {
        let img = image("bgra8", 1, 1, 4, vec![10, 20, 30, 255]);
        let shrunk = shrink_image(&img, &mut Diagnostics::new()).unwrap();
        assert_eq!(shrunk.format, "webp");
    }

    #[test]
    fn unrecognized_encoding_passes_through_with_one_warning() {
        let img = image("yuv422", 2, 1, 4, vec![9, 8, 7, 6]);
        let mut diagnostics = Diagnostics::new();

        for _ in 0..10 {
            let shrunk = shrink_image(&img, &mut diagnostics).unwrap();
            assert_eq!(shrunk.format, "");
            assert_eq!(shrunk.data, img.data);
        }
        assert_eq!(diagnostics.warned_count(), 1);

        // A second distinct tag warns again.
        let other = image("yuv420", 2, 1, 4, vec![0, 0, 0, 0]);
        shrink_image(&other, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.warned_count(), 2);
    }

    #[test]
    fn short_pixel_buffer_is_a_geometry_error() {
        // Declared 2x2 with step 3 needs 5 bytes; only 4 present.
        let img = image("mono8", 2, 2, 3, vec![1, 2, 3, 4]);
        assert!(matches!(
            shrink_image(&img, &mut Diagnostics::new()),
            Err(ShrinkError::ImageGeometry { .. })
        ));
    }

    #[test]
    fn absurd_geometry_is_an_error_not_a_panic() {
        let img = image("rgb8", u32::MAX, u32::MAX, u32::MAX, vec![0; 8]);
        assert!(matches!(
            shrink_image(&img, &mut Diagnostics::new()),
            Err(ShrinkError::ImageGeometry { .. })
        ));
    }

    #[test]
    fn zero_height_color_image_fails_in_the_encoder() {
        // Geometry is fine (nothing to read); the encoder rejects 0x0.
        let img = image("rgb8", 0, 0, 0, vec![]);
        assert!(matches!(
            shrink_image(&img, &mut Diagnostics::new()),
            Err(ShrinkError::Encode { .. })
        ));
    }
}
