//! Label and model lookup.
//!
//! A `ProfileRegistry` is built once (from the stock tables, or from records an
//! external loader parsed) and then only read. It is `Send + Sync`, so one value can
//! be shared by reference across threads.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    compress::MAX_BLOCK,
    error::{Error, Result},
    label::{builtin_labels, LabelSpec},
    model::{builtin_models, PrinterModel},
};

#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    labels: BTreeMap<String, LabelSpec>,
    models: BTreeMap<String, PrinterModel>,
}

/// Model ids are matched case-insensitively and `_` stands for `-`.
fn model_key(id: &str) -> String {
    id.to_ascii_uppercase().replace('_', "-")
}

impl ProfileRegistry {
    /// Registry holding the stock Brother DK labels and QL models.
    pub fn builtin() -> Self {
        let mut registry = ProfileRegistry::default();
        for label in builtin_labels() {
            registry.labels.insert(label.id.clone(), label);
        }
        for model in builtin_models() {
            registry.models.insert(model_key(&model.id), model);
        }
        registry
    }

    /// Build a registry from externally supplied records.
    pub fn new(labels: Vec<LabelSpec>, models: Vec<PrinterModel>) -> Result<Self> {
        ProfileRegistry::default().merge(labels, models)
    }

    /// Layer records over this registry. A record replaces any existing one with the
    /// same id. Every incoming record is validated before anything is replaced.
    pub fn merge(mut self, labels: Vec<LabelSpec>, models: Vec<PrinterModel>) -> Result<Self> {
        for label in &labels {
            label.validate()?;
        }
        for model in &models {
            validate_model(model)?;
        }
        for label in labels {
            debug!("registering label {}", label.id);
            self.labels.insert(label.id.clone(), label);
        }
        for model in models {
            debug!("registering model {}", model.id);
            self.models.insert(model_key(&model.id), model);
        }
        Ok(self)
    }

    pub fn get_label(&self, id: &str) -> Result<&LabelSpec> {
        self.labels
            .get(id)
            .ok_or_else(|| Error::label_not_found(id))
    }

    pub fn get_model(&self, id: &str) -> Result<&PrinterModel> {
        self.models
            .get(&model_key(id))
            .ok_or_else(|| Error::model_not_found(id))
    }

    /// Start column of `label` in the raster buffer of `model`, before any user
    /// offset.
    ///
    /// A per-label override on the model wins. Otherwise die-cut labels are centered
    /// in the buffer and endless labels are pushed against its trailing edge, keeping
    /// the label's right margin.
    pub fn resolve_position(&self, model: &PrinterModel, label: &LabelSpec) -> u32 {
        if let Some(position) = model.position_override(&label.id) {
            debug!(
                "{} / {}: using positioning override {}",
                model.id, label.id, position
            );
            return position;
        }

        let buffer_width = model.buffer_width();
        if label.is_endless() {
            buffer_width
                .saturating_sub(label.printable_width)
                .saturating_sub(label.right_margin_dots)
                .saturating_sub(model.additional_offset_r)
        } else {
            buffer_width.saturating_sub(label.printable_width) / 2
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &LabelSpec> {
        self.labels.values()
    }

    pub fn models(&self) -> impl Iterator<Item = &PrinterModel> {
        self.models.values()
    }

    pub fn labels_for_model<'a>(&'a self, model_id: &'a str) -> impl Iterator<Item = &'a LabelSpec> {
        self.labels().filter(move |l| l.allows_model(model_id))
    }

    pub fn die_cut_labels(&self) -> impl Iterator<Item = &LabelSpec> {
        self.labels().filter(|l| l.is_die_cut())
    }

    pub fn endless_labels(&self) -> impl Iterator<Item = &LabelSpec> {
        self.labels().filter(|l| l.is_endless())
    }

    pub fn two_color_models(&self) -> impl Iterator<Item = &PrinterModel> {
        self.models().filter(|m| m.two_color)
    }

    pub fn models_with_compression(&self) -> impl Iterator<Item = &PrinterModel> {
        self.models().filter(|m| m.compression)
    }

    pub fn wide_models(&self) -> impl Iterator<Item = &PrinterModel> {
        self.models().filter(|m| m.is_wide())
    }
}

fn validate_model(model: &PrinterModel) -> Result<()> {
    if model.bytes_per_row == 0 {
        return Err(Error::InvalidDimensions(format!(
            "model {} has zero bytes per row",
            model.id
        )));
    }
    // A compressed line can grow by one header byte per 128 bytes and must still fit
    // the one-byte length of a raster line command.
    let bytes_per_row = model.bytes_per_row as usize;
    let worst_line = bytes_per_row + (bytes_per_row + MAX_BLOCK - 1) / MAX_BLOCK;
    if worst_line > u8::MAX as usize {
        return Err(Error::InvalidDimensions(format!(
            "model {}: {} bytes per row exceed the raster line length limit",
            model.id, model.bytes_per_row
        )));
    }
    let (min, max) = model.min_max_length_dots;
    if min > max {
        return Err(Error::InvalidDimensions(format!(
            "model {}: length interval [{}, {}] is empty",
            model.id, min, max
        )));
    }
    let buffer_width = model.buffer_width();
    for override_ in model.positioning.values() {
        if override_.standard_position >= buffer_width {
            return Err(Error::OutOfBounds {
                start: override_.standard_position as i64,
                end: override_.standard_position as i64,
                buffer_width,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelKind;

    #[test]
    fn unknown_ids_are_not_found() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(
            registry.get_label("nonexistent"),
            Err(Error::NotFound {
                kind: "label",
                id: "nonexistent".to_string()
            })
        );
        assert!(matches!(
            registry.get_model("QL-9999"),
            Err(Error::NotFound { kind: "model", .. })
        ));
    }

    #[test]
    fn model_lookup_normalizes_id() {
        let registry = ProfileRegistry::builtin();
        let a = registry.get_model("QL-810W").unwrap();
        let b = registry.get_model("ql-810w").unwrap();
        let c = registry.get_model("QL_810W").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn override_wins_over_default() {
        let registry = ProfileRegistry::builtin();
        let label = registry.get_label("23x23").unwrap();
        let ql810 = registry.get_model("QL-810W").unwrap();
        let ql700 = registry.get_model("QL-700").unwrap();
        assert_eq!(registry.resolve_position(ql810, label), 450);
        assert_eq!(registry.resolve_position(ql700, label), (720 - 202) / 2);
    }

    #[test]
    fn die_cut_centering_floors_odd_remainder() {
        let registry = ProfileRegistry::builtin();
        let model = registry.get_model("QL-700").unwrap();
        // 720 - 165 = 555
        let label = registry.get_label("17x54").unwrap();
        assert_eq!(registry.resolve_position(model, label), 277);
    }

    #[test]
    fn endless_labels_are_right_aligned() {
        let registry = ProfileRegistry::builtin();
        let model = registry.get_model("QL-700").unwrap();
        let label = registry.get_label("62").unwrap();
        assert_eq!(registry.resolve_position(model, label), 720 - 696 - 12);
        let label = registry.get_label("12").unwrap();
        assert_eq!(registry.resolve_position(model, label), 585);

        let wide = registry.get_model("QL-1060N").unwrap();
        let label = registry.get_label("102").unwrap();
        assert_eq!(registry.resolve_position(wide, label), 1296 - 1164 - 12 - 44);
    }

    #[test]
    fn merge_replaces_and_validates() {
        let registry = ProfileRegistry::builtin();
        let mut custom = registry.get_label("62x29").unwrap().clone();
        custom.name = "Custom 62x29".to_string();
        let registry = registry.merge(vec![custom], Vec::new()).unwrap();
        assert_eq!(registry.get_label("62x29").unwrap().name, "Custom 62x29");

        let mut broken = registry.get_label("23x23").unwrap().clone();
        broken.printable_height = broken.total_height + 1;
        assert!(matches!(
            registry.clone().merge(vec![broken], Vec::new()),
            Err(Error::InvalidDimensions(_))
        ));

        let model = PrinterModel::new("QL-X", (150, 11811)).with_position("23x23", 720, "");
        assert!(matches!(
            registry.merge(Vec::new(), vec![model]),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn listings() {
        let registry = ProfileRegistry::builtin();
        assert!(registry
            .die_cut_labels()
            .all(|l| matches!(l.kind, LabelKind::DieCut | LabelKind::RoundDieCut)));
        assert!(registry.endless_labels().all(|l| l.printable_height == 0));
        assert!(registry.two_color_models().any(|m| m.id == "QL-820NWB"));
        assert!(registry.models_with_compression().all(|m| m.compression));
        assert!(registry.wide_models().all(|m| m.bytes_per_row > 90));

        let for_810: Vec<&str> = registry
            .labels_for_model("QL-810W")
            .map(|l| l.id.as_str())
            .collect();
        assert!(for_810.contains(&"23x23"));
        assert!(!for_810.contains(&"102x51"));
    }
}
