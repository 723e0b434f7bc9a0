//! Raster protocol state machine.
//!
//! A job goes through `Init -> Configured -> Streaming -> Finalized`. Configuration
//! happens once per job, every page opens with its own print information and then
//! streams one command per raster row. Pages are separated by a form feed and the job
//! ends with a single print-and-eject command.

use log::{debug, warn};

use crate::{
    command::{self, ExpandedMode, PrintInformation, VariousMode},
    compress::pack_bits,
    error::{Error, Result},
    label::LabelSpec,
    model::PrinterModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Configured,
    Streaming,
    Finalized,
}

/// Job-wide settings sent while configuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSettings {
    pub cut: bool,
    pub high_quality: bool,
    pub compress: bool,
    pub two_color: bool,
    pub dpi_600: bool,
    pub feed_margin: u16,
}

impl Default for ModeSettings {
    fn default() -> Self {
        ModeSettings {
            cut: true,
            high_quality: true,
            compress: false,
            two_color: false,
            dpi_600: false,
            feed_margin: 35,
        }
    }
}

/// Fail with `UnsupportedFeature` if `settings` asks for anything `model` lacks.
pub fn check_capabilities(model: &PrinterModel, settings: &ModeSettings) -> Result<()> {
    if settings.compress && !model.compression {
        return Err(Error::unsupported("Compression", &model.id));
    }
    if settings.two_color && !(model.two_color && model.expanded_mode) {
        return Err(Error::unsupported("Two-color printing", &model.id));
    }
    if settings.dpi_600 && !(model.dpi_600 && model.expanded_mode) {
        return Err(Error::unsupported("600 dpi printing", &model.id));
    }
    Ok(())
}

/// Fail with `InvalidDimensions` if a page of `rows` raster lines is outside the
/// feedable length of `model`. In 600 dpi mode two lines make one dot of length.
pub fn check_page_length(model: &PrinterModel, rows: u32, dpi_600: bool) -> Result<()> {
    let length = if dpi_600 { rows / 2 } else { rows };
    if model.accepts_length(length) {
        Ok(())
    } else {
        let (min, max) = model.min_max_length_dots;
        Err(Error::InvalidDimensions(format!(
            "page length {} dots is outside [{}, {}] supported by {}",
            length, min, max, model.id
        )))
    }
}

/// One device row, in device bit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterLine {
    black: Vec<u8>,
    red: Option<Vec<u8>>,
}

impl RasterLine {
    /// Place `row` (left to right, `true` = dot) at column `offset` of a buffer
    /// `bytes_per_row * 8` wide.
    pub fn place(row: &[bool], offset: u32, bytes_per_row: u32) -> Result<Self> {
        Ok(RasterLine {
            black: pack_row(row, offset, bytes_per_row)?,
            red: None,
        })
    }

    /// Same as [`RasterLine::place`] with a second, red plane.
    pub fn place_two_color(
        black: &[bool],
        red: &[bool],
        offset: u32,
        bytes_per_row: u32,
    ) -> Result<Self> {
        Ok(RasterLine {
            black: pack_row(black, offset, bytes_per_row)?,
            red: Some(pack_row(red, offset, bytes_per_row)?),
        })
    }

    pub fn black(&self) -> &[u8] {
        &self.black
    }

    pub fn red(&self) -> Option<&[u8]> {
        self.red.as_deref()
    }
}

/// The print head addresses the buffer from its far end, so column `c` is device bit
/// `buffer_width - 1 - c`, most significant bit first.
fn pack_row(row: &[bool], offset: u32, bytes_per_row: u32) -> Result<Vec<u8>> {
    let buffer_width = bytes_per_row * 8;
    let end = offset as i64 + row.len() as i64;
    if end > buffer_width as i64 {
        return Err(Error::OutOfBounds {
            start: offset as i64,
            end,
            buffer_width,
        });
    }

    let mut bytes = vec![0u8; bytes_per_row as usize];
    for (i, _) in row.iter().enumerate().filter(|&(_, &dot)| dot) {
        let bit = (buffer_width - 1 - (offset + i as u32)) as usize;
        bytes[bit / 8] |= 0x80 >> (bit % 8);
    }
    Ok(bytes)
}

pub struct RasterEncoder<'a> {
    model: &'a PrinterModel,
    state: State,
    settings: ModeSettings,
    pages: u32,
    data: Vec<u8>,
}

impl<'a> RasterEncoder<'a> {
    pub fn new(model: &'a PrinterModel) -> Self {
        RasterEncoder {
            model,
            state: State::Init,
            settings: ModeSettings::default(),
            pages: 0,
            data: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Bytes emitted so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn expect(&self, expected: State) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// `Init -> Configured`: reset the printer and send the job-wide modes.
    pub fn configure(&mut self, settings: ModeSettings) -> Result<()> {
        self.expect(State::Init)?;
        check_capabilities(self.model, &settings)?;

        let buf = &mut self.data;
        buf.extend(std::iter::repeat(0x00).take(self.model.invalidate_bytes));
        buf.extend_from_slice(&command::INITIALIZE);
        if self.model.mode_setting {
            buf.extend_from_slice(&command::SWITCH_TO_RASTER);
        }

        if self.model.cutting {
            let mut various_mode = VariousMode::empty();
            if settings.cut {
                various_mode |= VariousMode::AUTO_CUT;
            }
            debug!("Various mode: {:X}", various_mode.bits());
            buf.extend_from_slice(&command::VARIOUS_MODE);
            buf.push(various_mode.bits());
            if settings.cut {
                buf.extend_from_slice(&command::CUT_EVERY);
                buf.push(1);
            }
        } else if settings.cut {
            warn!("{} has no cutter, labels will only be fed", self.model.id);
        }

        if self.model.expanded_mode {
            let mut expanded_mode = ExpandedMode::empty();
            expanded_mode.set(ExpandedMode::TWO_COLOR, settings.two_color);
            expanded_mode.set(ExpandedMode::CUT_AT_END, settings.cut);
            expanded_mode.set(ExpandedMode::HIGH_RESOLUTION, settings.dpi_600);
            debug!("Expanded mode: {:X}", expanded_mode.bits());
            buf.extend_from_slice(&command::EXPANDED_MODE);
            buf.push(expanded_mode.bits());
        }

        buf.extend_from_slice(&command::MARGIN);
        buf.extend_from_slice(&settings.feed_margin.to_le_bytes());

        if self.model.compression {
            buf.push(command::COMPRESSION);
            buf.push(if settings.compress {
                command::COMPRESSION_PACK_BITS
            } else {
                command::COMPRESSION_NONE
            });
        }

        self.settings = settings;
        self.state = State::Configured;
        Ok(())
    }

    /// Pages opened so far.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// `Configured | Streaming -> Streaming`: open a page of `rows` raster lines.
    ///
    /// Opening a page while another is streaming prints that one first (`FF`).
    pub fn begin_page(&mut self, label: &LabelSpec, rows: u32) -> Result<()> {
        if self.state != State::Streaming {
            self.expect(State::Configured)?;
        }
        check_page_length(self.model, rows, self.settings.dpi_600)?;

        let mut flags = PrintInformation::RECOVER
            | PrintInformation::MEDIA_TYPE
            | PrintInformation::MEDIA_WIDTH
            | PrintInformation::MEDIA_LENGTH;
        flags.set(
            PrintInformation::PRIORITY_QUALITY,
            self.settings.high_quality,
        );
        debug!(
            "page on {}: {} raster lines, flags {:X}",
            label.id,
            rows,
            flags.bits()
        );

        let buf = &mut self.data;
        if self.state == State::Streaming {
            buf.push(command::PRINT);
        }
        buf.extend_from_slice(&command::PRINT_INFORMATION);
        buf.push(flags.bits());
        buf.push(label.kind.media_type());
        buf.push(label.width_mm as u8);
        buf.push(label.height_mm as u8);
        buf.extend_from_slice(&rows.to_le_bytes());
        // Starting page, then a fixed zero.
        let starting_page = if self.pages == 0 { 0x00 } else { 0x01 };
        buf.extend_from_slice(&[starting_page, 0x00]);

        self.pages += 1;
        self.state = State::Streaming;
        Ok(())
    }

    /// Emit one raster row.
    pub fn push_line(&mut self, line: &RasterLine) -> Result<()> {
        self.expect(State::Streaming)?;

        let bytes_per_row = self.model.bytes_per_row as usize;
        let planes_ok = line.black.len() == bytes_per_row
            && line.red.as_ref().map_or(true, |r| r.len() == bytes_per_row);
        if !planes_ok {
            return Err(Error::InvalidDimensions(format!(
                "raster line is not {} bytes wide",
                bytes_per_row
            )));
        }

        if self.settings.two_color {
            let blank;
            let red = match &line.red {
                Some(red) => red.as_slice(),
                None => {
                    blank = vec![0u8; bytes_per_row];
                    blank.as_slice()
                }
            };
            let black = self.plane(command::TWO_COLOR_LINE, command::PLANE_BLACK, &line.black)?;
            let red = self.plane(command::TWO_COLOR_LINE, command::PLANE_RED, red)?;
            self.data.extend_from_slice(&black);
            self.data.extend_from_slice(&red);
        } else {
            if line.red.is_some() {
                return Err(Error::InvalidParameter(
                    "red plane given to a single-color job".to_string(),
                ));
            }
            let black = self.plane(command::RASTER_LINE, 0x00, &line.black)?;
            self.data.extend_from_slice(&black);
        }
        Ok(())
    }

    /// One line command: opcode, selector, payload length, payload.
    fn plane(&self, opcode: u8, selector: u8, plane: &[u8]) -> Result<Vec<u8>> {
        let payload = if self.settings.compress {
            pack_bits(plane)
        } else {
            plane.to_vec()
        };
        let len = u8::try_from(payload.len()).map_err(|_| {
            Error::InvalidDimensions(format!(
                "raster line payload of {} bytes does not fit a length byte",
                payload.len()
            ))
        })?;

        let mut bytes = Vec::with_capacity(payload.len() + 3);
        bytes.extend_from_slice(&[opcode, selector, len]);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// `Streaming -> Finalized`: print and eject. Cutting was armed while configuring.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.expect(State::Streaming)?;
        self.data.push(command::PRINT_LAST);
        self.state = State::Finalized;
        debug!("raster job finished, {} bytes", self.data.len());
        Ok(self.data)
    }
}
