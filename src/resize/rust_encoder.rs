//! Pure Rust re-encoding backend.
//!
//! Everything is statically linked into the binary; no ImageMagick, no
//! libvips, no system packages.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify (JPEG, PNG, TIFF, WebP) | `image::image_dimensions` |
//! | Identify (AVIF) | `avif-parse` container metadata |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` + `rav1d` + YUV to RGB conversion |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `JpegEncoder`, quality 95 |
//! | Encode PNG | `PngEncoder`, best compression |
//! | Encode WebP | `WebPEncoder` (lossless; the pure-Rust encoder has no lossy mode) |
//! | Encode TIFF | `TiffEncoder` |
//! | Encode AVIF | `AvifEncoder` (rav1e), quality 90, speed 6 |
//!
//! The AVIF decoder is custom because the `image` crate's `"avif"` feature
//! only enables the rav1e **encoder**; decoding would need `"avif-native"`
//! and the C library dav1d. `rav1d` is the pure-Rust port of dav1d.
//!
//! Quality settings aim for near-lossless output: shrinking dimensions is
//! the size lever, not aggressive compression.

use super::encoder::{Dimensions, EncoderError, ImageEncoder};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;

const JPEG_QUALITY: u8 = 95;
const AVIF_QUALITY: u8 = 90;
const AVIF_SPEED: u8 = 6;

/// Pure Rust encoder using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEncoder for RustEncoder {
    fn identify(&self, path: &Path) -> Result<Dimensions, EncoderError> {
        if is_avif(path) {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            EncoderError::DecodeFailed(format!(
                "reading dimensions of {}: {e}",
                path.display()
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn encode_scaled(
        &self,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, EncoderError> {
        let ext = crate::scan::extension_of(path).unwrap_or_default();
        let img = load_image(path)?;
        let resized = img.resize_exact(width, height, FilterType::Lanczos3);
        encode_buffer(&resized, &ext)
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Load and decode an image from disk, normalizing EXIF orientation so the
/// re-encoded output displays the same way up as the original.
fn load_image(path: &Path) -> Result<DynamicImage, EncoderError> {
    if is_avif(path) {
        return decode_avif(path);
    }
    let decode_err =
        |e: image::ImageError| EncoderError::DecodeFailed(format!("{}: {e}", path.display()));

    let mut decoder = ImageReader::open(path)
        .map_err(EncoderError::Io)?
        .into_decoder()
        .map_err(decode_err)?;
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Re-encode in the source file's own format, to memory.
fn encode_buffer(img: &DynamicImage, ext: &str) -> Result<Vec<u8>, EncoderError> {
    let encode_err = |e: image::ImageError| EncoderError::EncodeFailed(e.to_string());
    let mut buffer = Vec::new();

    match ext {
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
            rgb.write_with_encoder(encoder).map_err(encode_err)?;
        }
        "png" => {
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut buffer),
                CompressionType::Best,
                PngFilterType::Adaptive,
            );
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        "webp" => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            let encoder = WebPEncoder::new_lossless(Cursor::new(&mut buffer));
            rgba.write_with_encoder(encoder).map_err(encode_err)?;
        }
        "tif" | "tiff" => {
            let encoder = TiffEncoder::new(Cursor::new(&mut buffer));
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        "avif" => {
            let encoder = AvifEncoder::new_with_speed_quality(
                Cursor::new(&mut buffer),
                AVIF_SPEED,
                AVIF_QUALITY,
            );
            img.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => return Err(EncoderError::UnsupportedFormat(other.to_string())),
    }

    Ok(buffer)
}

/// Extract dimensions from an AVIF file's container metadata without a full
/// AV1 decode.
fn identify_avif(path: &Path) -> Result<Dimensions, EncoderError> {
    let data = std::fs::read(path).map_err(EncoderError::Io)?;
    let avif = avif_parse::read_avif(&mut Cursor::new(&data)).map_err(|e| {
        EncoderError::DecodeFailed(format!("parsing AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        EncoderError::DecodeFailed(format!("AVIF metadata {}: {e:?}", path.display()))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Decode an AVIF file using avif-parse (container) + rav1d (AV1 decode).
fn decode_avif(path: &Path) -> Result<DynamicImage, EncoderError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    let failed = |msg: String| EncoderError::DecodeFailed(msg);

    let data_bytes = std::fs::read(path).map_err(EncoderError::Io)?;
    let avif = avif_parse::read_avif(&mut Cursor::new(&data_bytes)).map_err(|e| {
        failed(format!("parsing AVIF {}: {e:?}", path.display()))
    })?;
    let av1_bytes: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap())
    };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(failed(format!("rav1d open failed ({})", rc.0)));
    }

    let mut data = Dav1dData::default();
    let buf_ptr =
        unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(failed("rav1d data_create failed".into()));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(failed(format!("rav1d send_data failed ({})", rc.0)));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(failed(format!("rav1d get_picture failed ({})", rc.0)));
    }

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;
    let y_plane = Plane {
        ptr: pic.data[0].unwrap().as_ptr() as *const u8,
        stride: pic.stride[0],
    };

    let rgb = if layout == DAV1D_PIXEL_LAYOUT_I400 {
        yuv_to_rgb(y_plane, None, width, height, bpc, (false, false))
    } else {
        let chroma = ChromaPlanes {
            u: Plane {
                ptr: pic.data[1].unwrap().as_ptr() as *const u8,
                stride: pic.stride[1],
            },
            v: Plane {
                ptr: pic.data[2].unwrap().as_ptr() as *const u8,
                stride: pic.stride[1],
            },
        };
        let subsampling = match layout {
            DAV1D_PIXEL_LAYOUT_I420 => (true, true),
            DAV1D_PIXEL_LAYOUT_I422 => (true, false),
            DAV1D_PIXEL_LAYOUT_I444 => (false, false),
            _ => {
                unsafe {
                    rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
                    rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
                }
                return Err(failed(format!("unsupported AVIF pixel layout: {layout}")));
            }
        };
        yuv_to_rgb(y_plane, Some(chroma), width, height, bpc, subsampling)
    };

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| failed("constructing image from decoded AVIF planes".into()))
}

/// One decoded plane as rav1d hands it over.
#[derive(Clone, Copy)]
struct Plane {
    ptr: *const u8,
    stride: isize,
}

#[derive(Clone, Copy)]
struct ChromaPlanes {
    u: Plane,
    v: Plane,
}

/// Read one sample from a plane, handling 8-bit and 10/12-bit (u16) storage.
#[inline]
fn read_sample(plane: Plane, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *plane.ptr.offset(y as isize * plane.stride + x as isize) }) as f32
    } else {
        let offset = y as isize * plane.stride + x as isize * 2;
        (unsafe { *(plane.ptr.offset(offset) as *const u16) }) as f32
    }
}

/// Convert YUV planes to interleaved RGB8 using BT.601 coefficients.
///
/// `chroma` of `None` means monochrome (I400). `subsampling` gives the
/// horizontal and vertical chroma subsampling flags (I420 = both).
fn yuv_to_rgb(
    y_plane: Plane,
    chroma: Option<ChromaPlanes>,
    width: u32,
    height: u32,
    bpc: u32,
    subsampling: (bool, bool),
) -> Vec<u8> {
    let (ss_x, ss_y) = subsampling;
    let max_val = ((1u32 << bpc) - 1) as f32;
    let center = (1u32 << (bpc - 1)) as f32;
    let scale = 255.0 / max_val;

    let mut rgb = vec![0u8; (width * height * 3) as usize];

    for row in 0..height {
        for col in 0..width {
            let luma = read_sample(y_plane, col, row, bpc);

            let (r, g, b) = match chroma {
                None => {
                    let v = (luma * scale).clamp(0.0, 255.0);
                    (v, v, v)
                }
                Some(planes) => {
                    let cx = if ss_x { col / 2 } else { col };
                    let cy = if ss_y { row / 2 } else { row };
                    let cb = read_sample(planes.u, cx, cy, bpc) - center;
                    let cr = read_sample(planes.v, cx, cy, bpc) - center;
                    (
                        ((luma + 1.402 * cr) * scale).clamp(0.0, 255.0),
                        ((luma - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                        ((luma + 1.772 * cb) * scale).clamp(0.0, 255.0),
                    )
                }
            };

            let idx = ((row * width + col) * 3) as usize;
            rgb[idx] = r as u8;
            rgb[idx + 1] = g as u8;
            rgb[idx + 2] = b as u8;
        }
    }

    rgb
}
