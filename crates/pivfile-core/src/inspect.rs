use std::path::Path;

use crate::decode::mask::disabled_vectors;
use crate::decode::{Buffer, read_with};
use crate::error::PivError;
use crate::source::{DavisFileSource, RawSource};
use crate::{FieldSummary, InputInfo, Summary, make_summary};

/// Decode `path` with the built-in reader and summarize it.
pub fn inspect_file(path: &Path) -> Result<Summary, PivError> {
    inspect_source(path, &DavisFileSource::new())
}

/// Decode `path` with `source` and summarize it. The buffer is released
/// before returning.
pub fn inspect_source<S: RawSource + ?Sized>(path: &Path, source: &S) -> Result<Summary, PivError> {
    let bytes = path
        .metadata()
        .map_err(|err| PivError::FileOpen(format!("{}: {err}", path.display())))?
        .len();
    let (mut buffer, attributes) = read_with(source, path)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes,
    };
    let summary = summarize(&mut buffer, input, attributes.len());
    buffer.release()?;
    summary
}

/// Build a summary of a decoded buffer.
pub fn summarize(
    buffer: &mut Buffer,
    input: InputInfo,
    attribute_count: usize,
) -> Result<Summary, PivError> {
    let mut summary = make_summary(
        input,
        buffer.reader_kind()?,
        buffer.buffer_format()?,
        buffer.dimensions()?,
        buffer.scales()?.clone(),
    );
    summary.missing_scales = buffer.missing_scales()?.to_vec();
    summary.attribute_count = attribute_count;
    summary.block_count = buffer.block_count()?;

    if summary.buffer_format.is_vector() {
        summary.field = Some(field_summary(buffer)?);
    }
    Ok(summary)
}

fn field_summary(buffer: &mut Buffer) -> Result<FieldSummary, PivError> {
    let disabled = disabled_vectors(buffer)?;
    let vmag = buffer.vmag()?;
    let enabled: Vec<f64> = vmag
        .iter()
        .zip(disabled.iter())
        .filter(|(_, off)| !**off)
        .map(|(value, _)| *value)
        .filter(|value| value.is_finite())
        .collect();

    let (vmag_min, vmag_max, vmag_mean) = if enabled.is_empty() {
        (None, None, None)
    } else {
        let min = enabled.iter().copied().fold(f64::INFINITY, f64::min);
        let max = enabled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = enabled.iter().sum::<f64>() / enabled.len() as f64;
        (Some(min), Some(max), Some(mean))
    };

    Ok(FieldSummary {
        vectors: vmag.len(),
        enabled: disabled.iter().filter(|off| !**off).count(),
        vmag_min,
        vmag_max,
        vmag_mean,
    })
}
