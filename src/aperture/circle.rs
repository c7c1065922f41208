use crate::aperture::overlap::{annulus, pixel_overlap};
use crate::foundation::error::{ApphotError, ApphotResult};
use crate::pixel::view::{ImageView, Mask, Noise, NoiseKind, NoiseSource};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A circular aperture in pixel coordinates.
///
/// Pixel centers sit at integer coordinates, so `x = 10.0, y = 10.0`
/// centers the aperture exactly on a pixel.
pub struct Circle {
    /// Center x coordinate.
    pub x: f64,
    /// Center y coordinate.
    pub y: f64,
    /// Radius in pixels.
    pub r: f64,
}

impl Circle {
    /// Build a circle from center and radius.
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Options shared by the aperture measurements.
pub struct SumOpts {
    /// Conversion factor from flux units to detected quanta. When
    /// positive and the measured flux is positive, `sum / gain` is added
    /// to the variance as Poisson shot noise of the source itself.
    #[serde(default)]
    pub gain: f64,
    /// Side length of the subpixel sampling grid used for pixels on the
    /// aperture boundary. Must be at least 1; larger values trade time
    /// for overlap accuracy.
    #[serde(default = "default_subpix")]
    pub subpix: u32,
}

fn default_subpix() -> u32 {
    5
}

impl Default for SumOpts {
    fn default() -> Self {
        Self {
            gain: 0.0,
            subpix: default_subpix(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Status flags raised while scanning an aperture.
pub struct ApertureFlags {
    /// The aperture was clipped by an image edge.
    #[serde(default)]
    pub truncated: bool,
    /// At least one pixel inside the aperture was masked.
    #[serde(default)]
    pub has_masked: bool,
}

impl ApertureFlags {
    /// Pack into the flag word layout pipelines persist: bit 0 is
    /// truncation, bit 1 is masked-pixels-seen.
    pub fn bits(self) -> u8 {
        u8::from(self.truncated) | (u8::from(self.has_masked) << 1)
    }

    /// True when no flag is raised.
    pub fn is_empty(self) -> bool {
        !self.truncated && !self.has_masked
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Result of a circular-aperture measurement.
pub struct ApertureSum {
    /// Total flux: pixel values weighted by aperture overlap.
    pub sum: f64,
    /// Standard deviation of `sum`. Never negative.
    pub sum_err: f64,
    /// Scan status flags.
    pub flags: ApertureFlags,
}

#[tracing::instrument(skip(img, noise, mask))]
/// Sum pixel values over a circular aperture.
///
/// Every pixel overlapping the aperture contributes `value * overlap`,
/// where overlap is the fraction of the pixel inside the circle. Pixels
/// whose center is more than a half-diagonal inside the radius count
/// fully, pixels more than a half-diagonal outside are skipped without
/// touching the buffer, and the boundary annulus in between is subpixel
/// sampled on an [`SumOpts::subpix`]-per-side grid.
///
/// Variance accumulates alongside flux: a scalar noise value is
/// converted once up front, per-pixel noise is converted pixel by pixel,
/// and standard deviations are squared on the way in. Masked pixels
/// (mask value strictly above the threshold) are excluded from both
/// sums; afterwards the flux and variance are scaled by
/// `total area / unmasked area`, which assumes masked pixels carry the
/// same mean surface brightness as their neighbors. With a positive
/// [`SumOpts::gain`] and a positive corrected flux, `sum / gain` is
/// added to the variance as source shot noise. `sum_err` is the square
/// root of the final variance.
///
/// Parts of the aperture outside the image are never visited (they
/// contribute nothing) and set [`ApertureFlags::truncated`]. Rows are
/// addressed modulo the image height; see [`ImageView`] for the tiled
/// buffer contract.
///
/// A fully masked aperture has no unmasked area to correct against; the
/// division yields NaN and both `sum` and `sum_err` come back NaN.
/// Callers distinguish the case via [`ApertureFlags::has_masked`] and
/// `sum.is_nan()`.
///
/// # Errors
///
/// [`ApphotError::Validation`] when `opts.subpix == 0`. The scan itself
/// cannot fail.
///
/// # Panics
///
/// Panics if a buffer holds fewer than `width * height` elements; buffer
/// sizing is a caller contract, not a validated input.
pub fn sum_circle(
    img: &ImageView<'_>,
    noise: Option<&Noise<'_>>,
    mask: Option<&Mask<'_>>,
    circle: Circle,
    opts: &SumOpts,
) -> ApphotResult<ApertureSum> {
    if opts.subpix == 0 {
        return Err(ApphotError::validation("subpix must be >= 1"));
    }

    let w = i64::from(img.width);
    let h = i64::from(img.height);

    let Circle { x, y, r } = circle;
    let r2 = r * r;
    let (rin2, rout2) = annulus(r);

    let mut flags = ApertureFlags::default();

    // Scalar noise converts once; per-pixel noise converts in the loop.
    let mut varpix = 0.0;
    if let Some(n) = noise
        && let NoiseSource::Scalar(value) = n.source
    {
        varpix = value;
        if n.kind == NoiseKind::Stddev {
            varpix *= varpix;
        }
    }

    // Bounding box of the aperture. The half-pixel offsets keep
    // pixel-center semantics, the casts truncate toward zero, and any
    // clip against the image marks the measurement truncated.
    let mut xmin = (x - r + 0.499999) as i64;
    let mut xmax = (x + r + 1.499999) as i64;
    let mut ymin = (y - r + 0.499999) as i64;
    let mut ymax = (y + r + 1.499999) as i64;
    if xmin < 0 {
        xmin = 0;
        flags.truncated = true;
    }
    if xmax > w {
        xmax = w;
        flags.truncated = true;
    }
    if ymin < 0 {
        ymin = 0;
        flags.truncated = true;
    }
    if ymax > h {
        ymax = h;
        flags.truncated = true;
    }

    let mut tv = 0.0;
    let mut sigtv = 0.0;
    let mut area = 0.0;
    let mut goodarea = 0.0;

    for iy in ymin..ymax {
        let row = (iy % h) * w; // tiled-buffer row addressing
        for ix in xmin..xmax {
            let dx = ix as f64 - x;
            let dy = iy as f64 - y;
            let rpix2 = dx * dx + dy * dy;
            if rpix2 >= rout2 {
                continue;
            }
            let overlap = if rpix2 > rin2 {
                pixel_overlap(dx, dy, r2, opts.subpix)
            } else {
                1.0
            };

            let pos = (row + ix) as usize;
            let pix = img.data.get(pos);

            let mut var = varpix;
            if let Some(n) = noise
                && let NoiseSource::PerPixel(buf) = n.source
            {
                var = buf.get(pos);
                if n.kind == NoiseKind::Stddev {
                    var *= var;
                }
            }

            match mask {
                Some(m) => {
                    if m.pixels.get(pos) > m.threshold {
                        flags.has_masked = true;
                    } else {
                        tv += pix * overlap;
                        sigtv += var * overlap;
                        goodarea += overlap;
                    }
                    area += overlap;
                }
                None => {
                    tv += pix * overlap;
                    sigtv += var * overlap;
                }
            }
        }
    }

    // Masked pixels removed part of the aperture; scale both sums back
    // up by the area ratio. goodarea == 0 divides by zero and the NaN
    // propagates to the caller.
    if mask.is_some() {
        let correction = area / goodarea;
        tv *= correction;
        sigtv *= correction;
    }

    if opts.gain > 0.0 && tv > 0.0 {
        sigtv += tv / opts.gain;
    }

    Ok(ApertureSum {
        sum: tv,
        sum_err: sigtv.sqrt(),
        flags,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/aperture/circle.rs"]
mod tests;
