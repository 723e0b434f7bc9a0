//! Brother QL raster command opcodes.

use bitflags::bitflags;

/// ESC @ : Initialize
pub const INITIALIZE: [u8; 2] = [0x1B, 0x40];
/// ESC i a 01 : Switch to raster command mode
pub const SWITCH_TO_RASTER: [u8; 4] = [0x1B, 0x69, 0x61, 0x01];
/// ESC i z : Print information (media and quality)
pub const PRINT_INFORMATION: [u8; 3] = [0x1B, 0x69, 0x7A];
/// ESC i M : Various mode settings
pub const VARIOUS_MODE: [u8; 3] = [0x1B, 0x69, 0x4D];
/// ESC i A : Cut every n labels
pub const CUT_EVERY: [u8; 3] = [0x1B, 0x69, 0x41];
/// ESC i K : Expanded mode settings
pub const EXPANDED_MODE: [u8; 3] = [0x1B, 0x69, 0x4B];
/// ESC i d : Feed margin in dots
pub const MARGIN: [u8; 3] = [0x1B, 0x69, 0x64];
/// M : Compression mode
pub const COMPRESSION: u8 = 0x4D;
/// g : Monochrome raster line
pub const RASTER_LINE: u8 = 0x67;
/// w : Two-color raster line
pub const TWO_COLOR_LINE: u8 = 0x77;
/// Plane selectors following `w`.
pub const PLANE_BLACK: u8 = 0x01;
pub const PLANE_RED: u8 = 0x02;
/// FF : Print, more pages follow
pub const PRINT: u8 = 0x0C;
/// Control-Z : Print then eject
pub const PRINT_LAST: u8 = 0x1A;

/// `M` argument selecting no compression.
pub const COMPRESSION_NONE: u8 = 0x00;
/// `M` argument selecting TIFF PackBits.
pub const COMPRESSION_PACK_BITS: u8 = 0x02;

bitflags! {
    /// Argument of `ESC i M`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariousMode: u8 {
        const AUTO_CUT = 0b0100_0000;
    }
}

bitflags! {
    /// Argument of `ESC i K`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExpandedMode: u8 {
        const TWO_COLOR = 0b0000_0001;
        const CUT_AT_END = 0b0000_1000;
        const HIGH_RESOLUTION = 0b0100_0000;
    }
}

bitflags! {
    /// Validity flags, first argument of `ESC i z`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PrintInformation: u8 {
        const MEDIA_TYPE = 0b0000_0010;
        const MEDIA_WIDTH = 0b0000_0100;
        const MEDIA_LENGTH = 0b0000_1000;
        const PRIORITY_QUALITY = 0b0100_0000;
        const RECOVER = 0b1000_0000;
    }
}
