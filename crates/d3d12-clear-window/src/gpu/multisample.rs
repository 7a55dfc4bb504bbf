use crate::error::Result;
use eyre::bail;

/// Quality level to request for `sample_count` samples.
///
/// `query` asks the device how many quality levels it supports for that count; it is only
/// consulted when the surface is actually multisampled. Valid levels run from 0 to one less
/// than the supported count, and the highest one is picked.
pub fn multisample_quality(sample_count: u32, query: impl FnOnce(u32) -> Option<u32>) -> u32 {
    if sample_count < 2 {
        return 0;
    }
    query(sample_count)
        .map(|levels| levels.saturating_sub(1))
        .unwrap_or(0)
}

/// Fails when a resize asks for a different sample count than the swap chain was created with.
pub fn ensure_sample_count_unchanged(current: u32, requested: u32) -> Result<()> {
    if current.max(1) != requested.max(1) {
        bail!(
            "the swap chain was created with {current} sample(s) per pixel and cannot be resized \
             to {requested}"
        );
    }
    Ok(())
}
