//! Overlaying options onto a configuration

use super::base::LogConfig;
use super::options::{Options, RotationOptions};
use crate::core::LogResult;

/// Overlay `overrides` onto `target`
///
/// `directory`, `fileName`, `enableRotation` and `shortFieldNames` replace
/// the target's values. A non-empty `extraLogFields` resets the layout and
/// enables the listed extras. When rotation is enabled after that, the
/// rotation settings are re-resolved from `rotationOptions`, falling back to
/// the defaults of the current policy if none are given.
///
/// # Errors
///
/// Propagates rotation errors from
/// [`RotationSettings::apply`](super::rotation::RotationSettings::apply);
/// `target` may be partially updated when that happens.
pub fn merge(target: &mut LogConfig, overrides: &Options) -> LogResult<()> {
    let Options {
        directory,
        file_name,
        enable_rotation,
        short_field_names,
        extra_log_fields,
        rotation_options,
    } = overrides;

    if let Some(directory) = directory {
        target.directory.clone_from(directory);
    }
    if let Some(file_name) = file_name {
        target.file_name.clone_from(file_name);
    }
    if let Some(enable_rotation) = enable_rotation {
        target.enable_rotation = *enable_rotation;
    }
    if let Some(short_field_names) = short_field_names {
        target.short_field_names = *short_field_names;
    }

    if let Some(fields) = extra_log_fields.as_deref().filter(|f| !f.is_empty()) {
        target.layout.select_extras(fields);
    }

    if target.enable_rotation {
        let defaults = RotationOptions::default();
        target
            .rotation
            .apply(rotation_options.as_ref().unwrap_or(&defaults))?;
    }

    Ok(())
}
