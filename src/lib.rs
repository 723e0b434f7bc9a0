//! Brother QL raster converter
//!
//! This crate turns images into the raster instruction stream understood by Brother
//! QL series label printers. It does not talk to the printer: the returned bytes can
//! be written to a USB device, a file, or a network socket as they are.
//!
//! # Example
//!
//! ```rust,no_run
//! use ql_raster::{Options, Printer, ProfileRegistry};
//!
//! let registry = ProfileRegistry::builtin();
//! let mut printer = Printer::new(&registry, "QL-820NWB").unwrap();
//! let image = image::open("label.png").unwrap();
//! let options = Options::default().dither(true).compress(true);
//! let bytes = printer.convert(&registry, &[image], "62", &options).unwrap();
//! std::fs::write("label.bin", bytes).unwrap();
//! ```

mod binarize;
mod command;
mod compress;
mod convert;
mod error;
mod label;
mod model;
mod options;
mod position;
mod preprocess;
mod printer;
mod raster;
mod registry;

pub use crate::{
    binarize::{
        binarize, dither, grayscale, luminance, threshold, Binarization, Bitmap,
        DEFAULT_THRESHOLD_PERCENT,
    },
    compress::pack_bits,
    convert::convert,
    error::{Error, Result},
    label::{LabelKind, LabelSpec},
    model::{PositioningOverride, PrinterModel, DEFAULT_BYTES_PER_ROW, WIDE_BYTES_PER_ROW},
    options::Options,
    position::compute_offset,
    preprocess::{
        flatten, normalize, normalize_to, page_rows, separate_red, target_size, Rotate,
    },
    printer::Printer,
    raster::{
        check_capabilities, check_page_length, ModeSettings, RasterEncoder, RasterLine, State,
    },
    registry::ProfileRegistry,
};

/// Raster buffer width in dots of the 62mm class models (QL-5xx, 6xx, 7xx, 8xx).
///
/// Rows are 90 bytes wide when packed (720 / 8).
pub const NORMAL_PRINTER_WIDTH: u32 = 720;

/// Raster buffer width in dots of the 102mm class models (QL-10xx, QL-11xx).
///
/// Rows are 162 bytes wide when packed (1296 / 8).
pub const WIDE_PRINTER_WIDTH: u32 = 1296;
