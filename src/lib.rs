//! Apphot measures circular-aperture photometry on raw pixel buffers.
//!
//! Given a row-major image buffer, an optional noise source, an optional
//! bad-pixel mask and a circle, [`sum_circle`] estimates the total flux
//! inside the circle (pixel values weighted by their geometric overlap
//! with the aperture) and the propagated standard deviation of that flux.
//!
//! # Measurement overview
//!
//! 1. **View**: wrap caller-owned byte buffers in typed views
//!    ([`PixelBuf`], [`ImageView`], [`Noise`], [`Mask`]); element types
//!    are resolved to converters up front, before any pixel is read
//! 2. **Scan**: visit the clipped bounding box of the circle; pixels well
//!    inside or well outside the aperture skip subpixel work, the
//!    boundary annulus is subpixel-sampled ([`SumOpts::subpix`])
//! 3. **Correct**: masked pixels are excluded and the lost aperture area
//!    is compensated; an optional gain adds Poisson shot noise
//! 4. **Report**: [`ApertureSum`] carries the flux, its uncertainty and
//!    [`ApertureFlags`] (edge truncation, masked pixels seen)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate; raw element
//!   access goes through `bytemuck`.
//! - **Pure and reentrant**: the kernel performs no IO, allocates
//!   nothing, and only reads the buffers it is given. Concurrent calls
//!   over shared buffers are safe; [`sum_circle_batch`] fans out over
//!   many apertures with rayon.
//! - **Deterministic**: identical inputs produce identical results.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aperture;
mod foundation;
mod pixel;

pub use aperture::batch::sum_circle_batch;
pub use aperture::circle::{ApertureFlags, ApertureSum, Circle, SumOpts, sum_circle};
pub use foundation::error::{ApphotError, ApphotResult};
pub use pixel::elem::PixelKind;
pub use pixel::view::{ImageView, Mask, Noise, NoiseKind, NoiseSource, PixelBuf};
