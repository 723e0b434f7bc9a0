use crate::{
    binarize::{Binarization, DEFAULT_THRESHOLD_PERCENT},
    label::LabelSpec,
    preprocess::Rotate,
    raster::ModeSettings,
};

/// Conversion options.
///
/// Start from `Options::default()` and chain the setters you need.
///
/// # Example
///
/// ```
/// use ql_raster::{Options, Rotate};
///
/// let options = Options::default()
///     .cut(false)
///     .dither(true)
///     .rotate(Rotate::Deg90)
///     .offset_x(-4);
/// assert!(options.is_dither());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    cut: bool,
    dither: bool,
    threshold: i32,
    rotate: Rotate,
    compress: bool,
    red: bool,
    dpi_600: bool,
    hq: bool,
    offset_x: i32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            cut: true,
            dither: false,
            threshold: DEFAULT_THRESHOLD_PERCENT,
            rotate: Rotate::Auto,
            compress: false,
            red: false,
            dpi_600: false,
            hq: true,
            offset_x: 0,
        }
    }
}

impl Options {
    /// Cut after the last label. Without a cut the label is only fed out.
    pub fn cut(self, flag: bool) -> Self {
        Options { cut: flag, ..self }
    }

    /// Use Floyd-Steinberg dithering instead of a plain threshold.
    pub fn dither(self, flag: bool) -> Self {
        Options {
            dither: flag,
            ..self
        }
    }

    /// Luminance cutoff in percent, used when not dithering. Checked at conversion.
    pub fn threshold(self, percent: i32) -> Self {
        Options {
            threshold: percent,
            ..self
        }
    }

    pub fn rotate(self, rotate: Rotate) -> Self {
        Options { rotate, ..self }
    }

    /// PackBits-compress raster lines. The model must support it.
    pub fn compress(self, flag: bool) -> Self {
        Options {
            compress: flag,
            ..self
        }
    }

    /// Print pure red pixels on the red plane of two-color media.
    pub fn red(self, flag: bool) -> Self {
        Options { red: flag, ..self }
    }

    /// 300x600 dpi mode; die-cut images then need twice the rows.
    pub fn dpi_600(self, flag: bool) -> Self {
        Options {
            dpi_600: flag,
            ..self
        }
    }

    /// Give priority to print quality over speed.
    pub fn hq(self, flag: bool) -> Self {
        Options { hq: flag, ..self }
    }

    /// Shift the label horizontally by this many pixels.
    pub fn offset_x(self, pixels: i32) -> Self {
        Options {
            offset_x: pixels,
            ..self
        }
    }

    pub fn is_cut(&self) -> bool {
        self.cut
    }

    pub fn is_dither(&self) -> bool {
        self.dither
    }

    pub fn threshold_percent(&self) -> i32 {
        self.threshold
    }

    pub fn rotation(&self) -> Rotate {
        self.rotate
    }

    pub fn is_compress(&self) -> bool {
        self.compress
    }

    pub fn is_red(&self) -> bool {
        self.red
    }

    pub fn is_dpi_600(&self) -> bool {
        self.dpi_600
    }

    pub fn is_hq(&self) -> bool {
        self.hq
    }

    pub fn horizontal_offset(&self) -> i32 {
        self.offset_x
    }

    pub fn binarization(&self) -> Binarization {
        if self.dither {
            Binarization::Dither
        } else {
            Binarization::Threshold(self.threshold)
        }
    }

    pub(crate) fn mode_settings(&self, label: &LabelSpec) -> ModeSettings {
        ModeSettings {
            cut: self.cut,
            high_quality: self.hq,
            compress: self.compress,
            two_color: self.red,
            dpi_600: self.dpi_600,
            feed_margin: label.feed_margin,
        }
    }
}
