use rayon::prelude::*;

use crate::aperture::circle::{ApertureSum, Circle, SumOpts, sum_circle};
use crate::foundation::error::{ApphotError, ApphotResult};
use crate::pixel::view::{ImageView, Mask, Noise};

#[tracing::instrument(skip(img, noise, mask, circles))]
/// Measure many circular apertures on one image in parallel.
///
/// Equivalent to calling [`sum_circle`] per circle; results come back in
/// input order. The image, noise and mask views are shared read-only
/// across the rayon workers; each measurement writes only its own slot.
///
/// `threads` of `None` uses the rayon defaults; `Some(n)` builds a
/// dedicated pool with `n` workers for this call.
///
/// # Errors
///
/// [`ApphotError::Validation`] when `threads == Some(0)` or
/// `opts.subpix == 0`. The first failing measurement wins and no partial
/// output is returned.
pub fn sum_circle_batch(
    img: &ImageView<'_>,
    noise: Option<&Noise<'_>>,
    mask: Option<&Mask<'_>>,
    circles: &[Circle],
    opts: &SumOpts,
    threads: Option<usize>,
) -> ApphotResult<Vec<ApertureSum>> {
    let pool = build_thread_pool(threads)?;
    pool.install(|| {
        circles
            .par_iter()
            .map(|&circle| sum_circle(img, noise, mask, circle, opts))
            .collect()
    })
}

fn build_thread_pool(threads: Option<usize>) -> ApphotResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ApphotError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ApphotError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/aperture/batch.rs"]
mod tests;
