use log::debug;

use crate::{
    error::{Error, Result},
    label::LabelSpec,
    model::PrinterModel,
};

/// Final start column of `label` in the raster buffer of `model`.
///
/// `base_position` normally comes from [`ProfileRegistry::resolve_position`]; the
/// caller's `user_offset` shifts it. The whole printable width must stay inside
/// `[0, buffer_width)`.
///
/// [`ProfileRegistry::resolve_position`]: crate::ProfileRegistry::resolve_position
pub fn compute_offset(
    label: &LabelSpec,
    model: &PrinterModel,
    base_position: u32,
    user_offset: i32,
) -> Result<u32> {
    let buffer_width = model.buffer_width();
    let start = base_position as i64 + user_offset as i64;
    let end = start + label.printable_width as i64;

    if start < 0 || end > buffer_width as i64 {
        return Err(Error::OutOfBounds {
            start,
            end,
            buffer_width,
        });
    }

    debug!(
        "label {} placed at column {} (base {}, offset {})",
        label.id, start, base_position, user_offset
    );
    Ok(start as u32)
}
