use image::DynamicImage;

use crate::{error::Result, options::Options, registry::ProfileRegistry};

/// A reusable conversion context for one printer model.
///
/// The handle keeps the instructions of the last successful job. Every call to
/// [`Printer::convert`] starts from an empty buffer, so the buffer never mixes jobs
/// and nothing is left behind by a failed call.
///
/// Conversion needs `&mut self`; share a handle between threads only behind a lock,
/// or give each thread its own.
///
/// # Example
///
/// ```
/// use image::{DynamicImage, RgbImage, Rgb};
/// use ql_raster::{Options, Printer, ProfileRegistry};
///
/// let registry = ProfileRegistry::builtin();
/// let mut printer = Printer::new(&registry, "QL-810W").unwrap();
/// let label = DynamicImage::ImageRgb8(RgbImage::from_pixel(202, 202, Rgb([255, 255, 255])));
/// let bytes = printer
///     .convert(&registry, &[label], "23x23", &Options::default())
///     .unwrap();
/// assert_eq!(bytes.last(), Some(&0x1A));
/// ```
#[derive(Debug, Clone)]
pub struct Printer {
    model_id: String,
    data: Vec<u8>,
}

impl Printer {
    /// Fails with `NotFound` if `model` is not in `registry`.
    pub fn new(registry: &ProfileRegistry, model: &str) -> Result<Self> {
        let model = registry.get_model(model)?;
        Ok(Printer {
            model_id: model.id.clone(),
            data: Vec::new(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Instructions of the last successful job.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Take the pending instructions, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    pub(crate) fn commit(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Shorthand for [`crate::convert`] on this handle.
    pub fn convert(
        &mut self,
        registry: &ProfileRegistry,
        images: &[DynamicImage],
        label_id: &str,
        options: &Options,
    ) -> Result<Vec<u8>> {
        crate::convert::convert(registry, self, images, label_id, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn unknown_model_is_rejected() {
        let registry = ProfileRegistry::builtin();
        assert!(matches!(
            Printer::new(&registry, "QL-9999"),
            Err(Error::NotFound { kind: "model", .. })
        ));
    }

    #[test]
    fn model_id_is_canonical() {
        let registry = ProfileRegistry::builtin();
        let printer = Printer::new(&registry, "ql_820nwb").unwrap();
        assert_eq!(printer.model_id(), "QL-820NWB");
        assert!(printer.data().is_empty());
    }

    #[test]
    fn take_empties_buffer() {
        let registry = ProfileRegistry::builtin();
        let mut printer = Printer::new(&registry, "QL-700").unwrap();
        printer.commit(&[1, 2, 3]);
        assert_eq!(printer.take(), vec![1, 2, 3]);
        assert!(printer.data().is_empty());
        printer.commit(&[4]);
        printer.clear();
        assert!(printer.data().is_empty());
    }
}
