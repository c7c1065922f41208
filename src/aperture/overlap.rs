// Half-diagonal of a unit pixel (sqrt(2)/2, rounded up at the fourth
// decimal). A pixel center within `r - HALF_DIAG` of the aperture center
// is fully covered; beyond `r + HALF_DIAG` it cannot overlap at all.
const HALF_DIAG: f64 = 0.7072;

/// Squared inner and outer radii of the boundary annulus.
///
/// Only pixels whose center distance squared falls strictly between the
/// two need subpixel sampling; inside is overlap 1, outside is 0.
pub(crate) fn annulus(r: f64) -> (f64, f64) {
    let rin = r - HALF_DIAG;
    let rin2 = if rin > 0.0 { rin * rin } else { 0.0 };
    let rout = r + HALF_DIAG;
    (rin2, rout * rout)
}

/// Fraction of a unit pixel covered by the aperture, by subpixel
/// sampling.
///
/// `(dx, dy)` is the pixel center relative to the aperture center and
/// `r2` the squared radius. The pixel is cut into `subpix * subpix`
/// equal cells; a cell counts as covered when its center lies inside the
/// circle. Always in `[0, 1]`.
pub(crate) fn pixel_overlap(dx: f64, dy: f64, r2: f64, subpix: u32) -> f64 {
    let scale = 1.0 / f64::from(subpix);
    let scale2 = scale * scale;
    let offset = 0.5 * (scale - 1.0);

    let mut overlap = 0.0;
    let mut dy = dy + offset;
    for _ in 0..subpix {
        let dy2 = dy * dy;
        let mut dx1 = dx + offset;
        for _ in 0..subpix {
            if dx1 * dx1 + dy2 < r2 {
                overlap += scale2;
            }
            dx1 += scale;
        }
        dy += scale;
    }
    overlap
}
