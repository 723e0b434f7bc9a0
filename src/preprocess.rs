//! Bring an arbitrary input image to the printable size of a label.
//!
//! The input is never scaled or cropped: it is rotated if asked to, then centered on a
//! white canvas. An image that does not fit is an error.

use image::{imageops, DynamicImage, Rgb, RgbImage};
use log::debug;

use crate::{
    binarize::Bitmap,
    error::{Error, Result},
    label::LabelSpec,
};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const PURE_RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Image rotation, in degrees counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotate {
    /// Pick 0 or 90 degrees, whichever suits the label.
    #[default]
    Auto,
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotate {
    /// Parse an angle in degrees. Only multiples of 90 below 360 are accepted.
    pub fn from_degrees(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(Error::InvalidParameter(format!(
                "rotation must be 0, 90, 180 or 270, got {}",
                degrees
            ))),
        }
    }

    fn apply(self, image: &RgbImage) -> RgbImage {
        match self {
            Self::Auto | Self::Deg0 => image.clone(),
            // imageops rotates clockwise
            Self::Deg90 => imageops::rotate270(image),
            Self::Deg180 => imageops::rotate180(image),
            Self::Deg270 => imageops::rotate90(image),
        }
    }
}

/// Target canvas for a label: `(width, height)` with `None` height for endless media.
///
/// In 600 dpi mode every dot row is printed as two raster lines, so die-cut labels
/// expect twice the rows.
pub fn target_size(label: &LabelSpec, dpi_600: bool) -> (u32, Option<u32>) {
    let (width, height) = label.printable_size();
    let factor = if dpi_600 { 2 } else { 1 };
    (width, height.map(|h| h * factor))
}

/// Normalize `image` to exactly the printable area of `label`.
pub fn normalize(image: &DynamicImage, label: &LabelSpec, rotate: Rotate) -> Result<RgbImage> {
    normalize_to(image, target_size(label, false), rotate)
}

/// Normalize `image` to a `target` as returned by [`target_size`].
pub fn normalize_to(
    image: &DynamicImage,
    target: (u32, Option<u32>),
    rotate: Rotate,
) -> Result<RgbImage> {
    let rgb = flatten(image);
    let rotation = match rotate {
        Rotate::Auto => choose_rotation(rgb.dimensions(), target)?,
        explicit => explicit,
    };
    debug!(
        "normalize {}x{} to {:?} with rotation {:?}",
        rgb.width(),
        rgb.height(),
        target,
        rotation
    );
    let rotated = rotation.apply(&rgb);
    pad(rotated, target)
}

/// Raster rows an image of `size` will have once normalized to `target`, computed
/// without touching any pixel.
pub fn page_rows(size: (u32, u32), target: (u32, Option<u32>), rotate: Rotate) -> Result<u32> {
    let rotation = match rotate {
        Rotate::Auto => choose_rotation(size, target)?,
        explicit => explicit,
    };
    let height = match rotation {
        Rotate::Deg90 | Rotate::Deg270 => size.0,
        _ => size.1,
    };
    Ok(target.1.unwrap_or(height))
}

/// Drop any alpha channel by compositing over white.
pub fn flatten(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let value = src[c] as u32 * alpha + 255 * (255 - alpha);
            dst[c] = ((value + 127) / 255) as u8;
        }
    }
    out
}

fn fits((width, height): (u32, u32), (target_width, target_height): (u32, Option<u32>)) -> bool {
    width <= target_width && target_height.map_or(true, |th| height <= th)
}

fn choose_rotation(size: (u32, u32), target: (u32, Option<u32>)) -> Result<Rotate> {
    let (width, height) = size;
    let upright = fits(size, target);
    let turned = fits((height, width), target);

    match (upright, turned) {
        (true, false) => Ok(Rotate::Deg0),
        (false, true) => Ok(Rotate::Deg90),
        (false, false) => Err(too_large(size, target)),
        (true, true) => {
            let (target_width, target_height) = target;
            let turn = match target_height {
                // Endless: least horizontal padding.
                None => target_width - height < target_width - width,
                // Die-cut: match the label's orientation.
                Some(target_height) => {
                    target_width != target_height
                        && width != height
                        && (width > height) != (target_width > target_height)
                }
            };
            Ok(if turn { Rotate::Deg90 } else { Rotate::Deg0 })
        }
    }
}

fn too_large((width, height): (u32, u32), target: (u32, Option<u32>)) -> Error {
    let target = match target {
        (w, Some(h)) => format!("{}x{}", w, h),
        (w, None) => format!("{} wide", w),
    };
    Error::InvalidDimensions(format!(
        "image {}x{} does not fit printable area {}",
        width, height, target
    ))
}

fn pad(image: RgbImage, target: (u32, Option<u32>)) -> Result<RgbImage> {
    let size = image.dimensions();
    if !fits(size, target) {
        return Err(too_large(size, target));
    }

    let (width, height) = size;
    let target_width = target.0;
    let target_height = target.1.unwrap_or(height);
    if (width, height) == (target_width, target_height) {
        return Ok(image);
    }

    let mut canvas = RgbImage::from_pixel(target_width, target_height, WHITE);
    let x = (target_width - width) / 2;
    let y = (target_height - height) / 2;
    imageops::replace(&mut canvas, &image, x as i64, y as i64);
    Ok(canvas)
}

/// Split an image for two-color media.
///
/// Only exact `(255, 0, 0)` pixels are red; they are set in the returned red plane and
/// whitened in the returned image, which holds everything destined for the black plane.
pub fn separate_red(image: &RgbImage) -> (RgbImage, Bitmap) {
    let (width, height) = image.dimensions();
    let mut black = image.clone();
    let mut red = Bitmap::new(width, height);

    for (x, y, pixel) in black.enumerate_pixels_mut() {
        if *pixel == PURE_RED {
            red.set(x, y, true);
            *pixel = WHITE;
        }
    }
    (black, red)
}
