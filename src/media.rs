use std::path::Path;

use arboard::Clipboard;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::imageops::FilterType as ResizeFilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::MediaError;

const PASTE_MAX_WIDTH: u32 = 1920;
const PASTE_MAX_HEIGHT: u32 = 1080;

pub struct DecodedImage {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))
}

/// Embed a local image file as a data URI. The bytes are stored untouched.
pub fn image_file_to_data_uri(path: &Path) -> Result<String, MediaError> {
    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|_| MediaError::Unsupported)?;
    Ok(to_data_uri(format.to_mime_type(), &bytes))
}

pub fn clipboard_image_to_data_uri() -> Result<String, MediaError> {
    let mut clipboard = Clipboard::new().map_err(|err| MediaError::Clipboard(err.to_string()))?;
    let image = match clipboard.get_image() {
        Ok(image) => image,
        Err(arboard::Error::ContentNotAvailable) => {
            return Err(MediaError::Clipboard("no image on the clipboard".to_string()));
        }
        Err(err) => return Err(MediaError::Clipboard(err.to_string())),
    };

    let rgba = raw_pixels_to_rgba(image.width, image.height, &image.bytes)?;
    let png = encode_png(&shrink_to_fit(rgba))?;
    Ok(to_data_uri("image/png", &png))
}

/// Clipboard buffers come as tight RGBA, tight RGB, or row-padded variants of either.
fn raw_pixels_to_rgba(width: usize, height: usize, bytes: &[u8]) -> Result<RgbaImage, MediaError> {
    let pixels = width
        .checked_mul(height)
        .filter(|count| *count > 0)
        .ok_or_else(|| MediaError::Decode("clipboard image is empty".to_string()))?;
    let too_large = || MediaError::Decode(format!("clipboard image {width}x{height} is too large"));
    let rgba_len = pixels.checked_mul(4).ok_or_else(too_large)?;
    let rgb_len = pixels.checked_mul(3).ok_or_else(too_large)?;

    let rgba = if bytes.len() == rgba_len {
        bytes.to_vec()
    } else if bytes.len() == rgb_len {
        rgb_to_rgba(bytes)
    } else if bytes.len() % height == 0 && bytes.len() / height >= width * 3 {
        let stride = bytes.len() / height;
        let channels = if stride >= width * 4 { 4 } else { 3 };
        let mut packed = Vec::with_capacity(rgba_len);
        for row in bytes.chunks_exact(stride) {
            let row = &row[..width * channels];
            if channels == 4 {
                packed.extend_from_slice(row);
            } else {
                packed.extend(rgb_to_rgba(row));
            }
        }
        packed
    } else {
        return Err(MediaError::Decode(format!(
            "{width}x{height} with {} bytes (expected {rgba_len} RGBA or {rgb_len} RGB)",
            bytes.len()
        )));
    };

    RgbaImage::from_raw(width as u32, height as u32, rgba)
        .ok_or_else(|| MediaError::Decode("failed to build RGBA image".to_string()))
}

fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|px| [px[0], px[1], px[2], 255])
        .collect()
}

fn shrink_to_fit(rgba: RgbaImage) -> RgbaImage {
    let (width, height) = rgba.dimensions();
    if width <= PASTE_MAX_WIDTH && height <= PASTE_MAX_HEIGHT {
        return rgba;
    }
    image::DynamicImage::ImageRgba8(rgba)
        .resize(PASTE_MAX_WIDTH, PASTE_MAX_HEIGHT, ResizeFilterType::Triangle)
        .to_rgba8()
}

fn encode_png(rgba: &RgbaImage) -> Result<Vec<u8>, MediaError> {
    let mut encoded = Vec::new();
    PngEncoder::new_with_quality(&mut encoded, CompressionType::Fast, FilterType::Adaptive)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )?;
    Ok(encoded)
}

/// Decode an image data URI into RGBA pixels for a texture.
pub fn decode_data_uri(uri: &str) -> Result<DecodedImage, MediaError> {
    let rest = uri.strip_prefix("data:").ok_or(MediaError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::NotDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::NotDataUri)?;
    if !mime.starts_with("image/") {
        return Err(MediaError::NotDataUri);
    }

    let bytes = BASE64_STANDARD.decode(payload.trim())?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    Ok(DecodedImage {
        size: [rgba.width() as usize, rgba.height() as usize],
        rgba: rgba.into_raw(),
    })
}
