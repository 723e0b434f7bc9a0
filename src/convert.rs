//! Images in, raster instructions out.

use image::DynamicImage;
use log::{debug, info};

use crate::{
    binarize::{binarize, check_threshold, Bitmap},
    error::{Error, Result},
    label::LabelSpec,
    model::PrinterModel,
    options::Options,
    position::compute_offset,
    preprocess::{normalize_to, page_rows, separate_red, target_size},
    printer::Printer,
    raster::{check_capabilities, check_page_length, RasterEncoder, RasterLine},
    registry::ProfileRegistry,
};

/// One binarized page, ready to be placed into raster lines.
struct Page {
    black: Bitmap,
    red: Option<Bitmap>,
}

/// Convert `images` into one print job for `label_id` on the model of `printer`.
///
/// The handle buffer is reset first. On success it holds exactly the returned
/// instructions; on error it stays empty. Every image becomes one page, and a job
/// with several pages is the same as one job whose pages are back to back, framed by
/// a single preamble and a single final print command.
pub fn convert(
    registry: &ProfileRegistry,
    printer: &mut Printer,
    images: &[DynamicImage],
    label_id: &str,
    options: &Options,
) -> Result<Vec<u8>> {
    printer.clear();

    let label = registry.get_label(label_id)?;
    let model = registry.get_model(printer.model_id())?;
    info!(
        "converting {} image(s) for label {} on {}",
        images.len(),
        label.id,
        model.id
    );

    if !label.allows_model(&model.id) {
        return Err(Error::unsupported(format!("Label {}", label.id), &model.id));
    }
    if images.is_empty() {
        return Err(Error::InvalidParameter("no images to convert".to_string()));
    }
    if !options.is_dither() {
        check_threshold(options.threshold_percent())?;
    }

    let settings = options.mode_settings(label);
    check_capabilities(model, &settings)?;

    let base = registry.resolve_position(model, label);
    let offset = compute_offset(label, model, base, options.horizontal_offset())?;

    let pages = images
        .iter()
        .map(|image| prepare_page(image, label, model, options))
        .collect::<Result<Vec<_>>>()?;

    let mut encoder = RasterEncoder::new(model);
    encoder.configure(settings)?;
    for (index, page) in pages.iter().enumerate() {
        debug!("page {}: {} rows", index + 1, page.black.height());
        encoder.begin_page(label, page.black.height())?;
        for y in 0..page.black.height() {
            let line = match &page.red {
                Some(red) => RasterLine::place_two_color(
                    page.black.row(y),
                    red.row(y),
                    offset,
                    model.bytes_per_row,
                )?,
                None => RasterLine::place(page.black.row(y), offset, model.bytes_per_row)?,
            };
            encoder.push_line(&line)?;
        }
    }
    let data = encoder.finish()?;

    info!("print job ready: {} page(s), {} bytes", pages.len(), data.len());
    printer.commit(&data);
    Ok(data)
}

fn prepare_page(
    image: &DynamicImage,
    label: &LabelSpec,
    model: &PrinterModel,
    options: &Options,
) -> Result<Page> {
    let target = target_size(label, options.is_dpi_600());
    // Reject an unprintable page length before allocating its canvas.
    let rows = page_rows((image.width(), image.height()), target, options.rotation())?;
    check_page_length(model, rows, options.is_dpi_600())?;

    let normalized = normalize_to(image, target, options.rotation())?;
    let strategy = options.binarization();

    if options.is_red() {
        let (rest, red) = separate_red(&normalized);
        Ok(Page {
            black: binarize(&rest, strategy)?,
            red: Some(red),
        })
    } else {
        Ok(Page {
            black: binarize(&normalized, strategy)?,
            red: None,
        })
    }
}
