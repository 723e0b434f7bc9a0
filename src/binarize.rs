//! Convert continuous-tone pixels to strict black and white.

use image::{GrayImage, Luma, Rgb, RgbImage};
use log::debug;

use crate::error::{Error, Result};

/// Default cutoff, in percent of full luminance.
pub const DEFAULT_THRESHOLD_PERCENT: i32 = 70;

/// Pixels below this value are black when dithering.
const DITHER_MIDPOINT: i32 = 128;

/// A strictly binary image. `true` means a printed (black) dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    dots: Vec<bool>,
}

impl Bitmap {
    /// All-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Bitmap {
            width,
            height,
            dots: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        self.dots[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        self.dots[(y * self.width + x) as usize] = black;
    }

    /// One row, left to right.
    pub fn row(&self, y: u32) -> &[bool] {
        let start = (y * self.width) as usize;
        &self.dots[start..start + self.width as usize]
    }

    pub fn count_black(&self) -> usize {
        self.dots.iter().filter(|&&d| d).count()
    }

    /// Render as grayscale, black = 0 and white = 255.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_black(x, y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

/// Binarization strategy. Exactly one is used per conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binarization {
    /// Luminance cutoff in percent.
    Threshold(i32),
    /// Floyd-Steinberg error diffusion.
    Dither,
}

/// Perceptual luminance (ITU-R BT.601 weights, 16.16 fixed point).
pub fn luminance(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + 0x8000) >> 16) as u8
}

pub fn grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luminance(*image.get_pixel(x, y))])
    })
}

pub fn check_threshold(percent: i32) -> Result<()> {
    if (0..=100).contains(&percent) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "threshold must be within 0..=100 percent, got {}",
            percent
        )))
    }
}

/// Black where luminance is below `percent` of full scale.
pub fn threshold(image: &GrayImage, percent: i32) -> Result<Bitmap> {
    check_threshold(percent)?;
    debug!(
        "threshold {}x{} at {}%",
        image.width(),
        image.height(),
        percent
    );

    let mut bitmap = Bitmap::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let luma = pixel[0] as i32;
        bitmap.set(x, y, luma * 100 < percent * 255);
    }
    Ok(bitmap)
}

/// Floyd-Steinberg error diffusion in raster order.
///
/// Error goes 7/16 right, 3/16 below-left, 5/16 below and 1/16 below-right. Shares
/// falling outside the image are dropped. Integer arithmetic keeps the output
/// identical on every platform.
pub fn dither(image: &GrayImage) -> Bitmap {
    let (width, height) = image.dimensions();
    debug!("dither {}x{}", width, height);

    let w = width as usize;
    let h = height as usize;
    let mut buffer: Vec<i32> = image.pixels().map(|p| p[0] as i32).collect();
    let mut bitmap = Bitmap::new(width, height);

    for y in 0..h {
        for x in 0..w {
            let old = buffer[y * w + x];
            let black = old < DITHER_MIDPOINT;
            let error = old - if black { 0 } else { 255 };
            bitmap.set(x as u32, y as u32, black);

            if x + 1 < w {
                buffer[y * w + x + 1] += error * 7 / 16;
            }
            if y + 1 < h {
                if x > 0 {
                    buffer[(y + 1) * w + x - 1] += error * 3 / 16;
                }
                buffer[(y + 1) * w + x] += error * 5 / 16;
                if x + 1 < w {
                    buffer[(y + 1) * w + x + 1] += error / 16;
                }
            }
        }
    }
    bitmap
}

/// Luminance followed by the chosen strategy.
pub fn binarize(image: &RgbImage, strategy: Binarization) -> Result<Bitmap> {
    let gray = grayscale(image);
    match strategy {
        Binarization::Threshold(percent) => threshold(&gray, percent),
        Binarization::Dither => Ok(dither(&gray)),
    }
}
