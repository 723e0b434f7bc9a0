//! Label (media) specifications.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Physical form of a label roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelKind {
    /// Pre-cut labels of fixed length.
    DieCut,
    /// Pre-cut round labels; handled like `DieCut` everywhere but in listings.
    RoundDieCut,
    /// Continuous roll, length chosen per job.
    Endless,
}

impl LabelKind {
    pub fn is_endless(&self) -> bool {
        matches!(self, Self::Endless)
    }

    /// Media type byte sent in `ESC i z`.
    pub fn media_type(&self) -> u8 {
        match self {
            Self::Endless => 0x0A,
            Self::DieCut | Self::RoundDieCut => 0x0B,
        }
    }
}

/// Everything the converter needs to know about one label type.
///
/// Dimensions are in device dots (300 dpi). For endless labels the heights are `0`:
/// the page length follows the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub id: String,
    pub name: String,
    pub width_mm: f32,
    #[serde(default)]
    pub height_mm: f32,
    pub kind: LabelKind,
    pub printable_width: u32,
    #[serde(default)]
    pub printable_height: u32,
    pub total_width: u32,
    #[serde(default)]
    pub total_height: u32,
    #[serde(default)]
    pub right_margin_dots: u32,
    #[serde(default = "default_feed_margin")]
    pub feed_margin: u16,
    /// Models this label may be used with. Empty means any model.
    #[serde(default)]
    pub restricted_to_models: Vec<String>,
}

fn default_feed_margin() -> u16 {
    35
}

impl LabelSpec {
    pub fn is_endless(&self) -> bool {
        self.kind.is_endless()
    }

    pub fn is_die_cut(&self) -> bool {
        !self.kind.is_endless()
    }

    /// Printable area as `(width, height)`; height is `None` for endless labels.
    pub fn printable_size(&self) -> (u32, Option<u32>) {
        if self.is_endless() {
            (self.printable_width, None)
        } else {
            (self.printable_width, Some(self.printable_height))
        }
    }

    pub fn allows_model(&self, model_id: &str) -> bool {
        self.restricted_to_models.is_empty()
            || self
                .restricted_to_models
                .iter()
                .any(|m| m.eq_ignore_ascii_case(model_id))
    }

    /// Reject records whose printable area does not fit in the label.
    pub fn validate(&self) -> Result<()> {
        if self.printable_width == 0 {
            return Err(Error::InvalidDimensions(format!(
                "label {} has zero printable width",
                self.id
            )));
        }
        if self.printable_width > self.total_width {
            return Err(Error::InvalidDimensions(format!(
                "label {}: printable width {} exceeds total width {}",
                self.id, self.printable_width, self.total_width
            )));
        }
        if self.printable_height > self.total_height {
            return Err(Error::InvalidDimensions(format!(
                "label {}: printable height {} exceeds total height {}",
                self.id, self.printable_height, self.total_height
            )));
        }
        if self.is_die_cut() && self.printable_height == 0 {
            return Err(Error::InvalidDimensions(format!(
                "die-cut label {} has zero printable height",
                self.id
            )));
        }
        Ok(())
    }

    fn endless(id: &str, mm: f32, total: u32, printable: u32, right_margin: u32) -> Self {
        LabelSpec {
            id: id.to_string(),
            name: format!("{}mm endless", mm),
            width_mm: mm,
            height_mm: 0.0,
            kind: LabelKind::Endless,
            printable_width: printable,
            printable_height: 0,
            total_width: total,
            total_height: 0,
            right_margin_dots: right_margin,
            feed_margin: 35,
            restricted_to_models: Vec::new(),
        }
    }

    fn die_cut(
        id: &str,
        kind: LabelKind,
        mm: (f32, f32),
        total: (u32, u32),
        printable: (u32, u32),
        right_margin: u32,
    ) -> Self {
        let name = match kind {
            LabelKind::RoundDieCut => format!("{}mm round die-cut", mm.0),
            _ => format!("{}mm x {}mm die-cut", mm.0, mm.1),
        };
        LabelSpec {
            id: id.to_string(),
            name,
            width_mm: mm.0,
            height_mm: mm.1,
            kind,
            printable_width: printable.0,
            printable_height: printable.1,
            total_width: total.0,
            total_height: total.1,
            right_margin_dots: right_margin,
            feed_margin: 0,
            restricted_to_models: Vec::new(),
        }
    }

    fn restricted(self, models: &[&str]) -> Self {
        LabelSpec {
            restricted_to_models: models.iter().map(|m| m.to_string()).collect(),
            ..self
        }
    }
}

/// Models allowed to use the 102mm rolls. The list mirrors the stock label profile
/// file, which predates the QL-1100 series; those models get the rolls through a
/// profile record that widens `restricted_to_models`.
const WIDE_MODELS: [&str; 2] = ["QL-1050", "QL-1060N"];

/// Stock Brother DK label table.
pub(crate) fn builtin_labels() -> Vec<LabelSpec> {
    use LabelKind::{DieCut, RoundDieCut};

    vec![
        LabelSpec::endless("12", 12.0, 142, 106, 29),
        LabelSpec::endless("29", 29.0, 342, 306, 6),
        LabelSpec::endless("38", 38.0, 449, 413, 12),
        LabelSpec::endless("50", 50.0, 590, 554, 12),
        LabelSpec::endless("54", 54.0, 636, 590, 0),
        LabelSpec::endless("62", 62.0, 732, 696, 12),
        LabelSpec {
            name: "62mm endless (black/red/white)".to_string(),
            ..LabelSpec::endless("62red", 62.0, 732, 696, 12)
        },
        LabelSpec::endless("102", 102.0, 1200, 1164, 12).restricted(&WIDE_MODELS),
        LabelSpec::die_cut("17x54", DieCut, (17.0, 54.0), (201, 636), (165, 566), 0),
        LabelSpec::die_cut("17x87", DieCut, (17.0, 87.0), (201, 1026), (165, 956), 0),
        LabelSpec::die_cut("23x23", DieCut, (23.0, 23.0), (272, 272), (202, 202), 42),
        LabelSpec::die_cut("29x42", DieCut, (29.0, 42.0), (342, 495), (306, 425), 6),
        LabelSpec::die_cut("29x90", DieCut, (29.0, 90.0), (342, 1061), (306, 991), 6),
        LabelSpec::die_cut("39x90", DieCut, (38.0, 90.0), (461, 1061), (425, 991), 6),
        LabelSpec::die_cut("39x48", DieCut, (39.0, 48.0), (461, 565), (425, 495), 6),
        LabelSpec::die_cut("52x29", DieCut, (52.0, 29.0), (614, 341), (578, 271), 0),
        LabelSpec::die_cut("62x29", DieCut, (62.0, 29.0), (732, 341), (696, 271), 12),
        LabelSpec::die_cut("62x100", DieCut, (62.0, 100.0), (732, 1179), (696, 1109), 12),
        LabelSpec::die_cut("102x51", DieCut, (102.0, 51.0), (1200, 596), (1164, 526), 12)
            .restricted(&WIDE_MODELS),
        LabelSpec::die_cut("102x152", DieCut, (102.0, 153.0), (1200, 1804), (1164, 1660), 12)
            .restricted(&WIDE_MODELS),
        LabelSpec::die_cut("d12", RoundDieCut, (12.0, 12.0), (142, 142), (94, 94), 113),
        LabelSpec::die_cut("d24", RoundDieCut, (24.0, 24.0), (284, 284), (236, 236), 42),
        LabelSpec::die_cut("d58", RoundDieCut, (58.0, 58.0), (688, 688), (618, 618), 51),
    ]
}
