use crate::foundation::error::ApphotResult;
use crate::pixel::elem::{ElemReader, PixelKind};

/// Read-only typed view over a caller-owned flat buffer.
///
/// The buffer stays borrowed for the lifetime of the view; nothing is
/// copied. The element converter is resolved once, here, so per-pixel
/// reads are a single indexed dispatch.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuf<'a> {
    bytes: &'a [u8],
    kind: PixelKind,
    reader: ElemReader,
}

impl<'a> PixelBuf<'a> {
    /// Wrap `bytes` as elements of `kind`.
    pub fn new(bytes: &'a [u8], kind: PixelKind) -> Self {
        Self {
            bytes,
            kind,
            reader: kind.reader(),
        }
    }

    /// Wrap `bytes` with the element type given as an external type code.
    ///
    /// Fails with [`crate::ApphotError::UnsupportedType`] for codes that
    /// do not map to a [`PixelKind`]; no pixel is read on that path.
    pub fn from_code(bytes: &'a [u8], code: i32) -> ApphotResult<Self> {
        Ok(Self::new(bytes, PixelKind::from_code(code)?))
    }

    /// Element type of this buffer.
    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    /// Number of whole elements in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.size_bytes()
    }

    /// True when the buffer holds no whole element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert element `index` to `f64`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the buffer.
    pub fn get(&self, index: usize) -> f64 {
        self.reader.value(self.bytes, index)
    }
}

/// Row-major 2D view over a [`PixelBuf`].
///
/// Pixel centers sit at integer coordinates; `(0, 0)` is the first
/// element. Row addressing takes the row index modulo `height`: a buffer
/// holding a vertically tiled (wrapped) image may be scanned past its
/// nominal height and rows repeat. This is part of the addressing
/// contract, not an accident.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    /// Pixel values, `width * height` elements.
    pub data: PixelBuf<'a>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl<'a> ImageView<'a> {
    /// Wrap a buffer with its dimensions.
    ///
    /// `data` holding fewer than `width * height` elements is a caller
    /// contract violation; measurements over such a view panic on the
    /// first out-of-bounds row rather than reporting an error.
    pub fn new(data: PixelBuf<'a>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// How stored noise values scale into the variance accumulator.
///
/// Accumulation is always in variance; standard deviations are squared
/// on the way in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NoiseKind {
    /// Stored values are standard deviations.
    Stddev,
    /// Stored values are variances.
    Variance,
}

/// Where noise values come from.
#[derive(Clone, Copy, Debug)]
pub enum NoiseSource<'a> {
    /// One value applied uniformly to every pixel. Converted (and
    /// squared, for [`NoiseKind::Stddev`]) once per measurement.
    Scalar(f64),
    /// A per-pixel buffer parallel to the data buffer.
    PerPixel(PixelBuf<'a>),
}

/// Noise model attached to a measurement.
#[derive(Clone, Copy, Debug)]
pub struct Noise<'a> {
    /// Scalar or per-pixel values.
    pub source: NoiseSource<'a>,
    /// Interpretation of the stored values.
    pub kind: NoiseKind,
}

impl<'a> Noise<'a> {
    /// Uniform noise from a single value.
    pub fn scalar(value: f64, kind: NoiseKind) -> Noise<'static> {
        Noise {
            source: NoiseSource::Scalar(value),
            kind,
        }
    }

    /// Per-pixel noise parallel to the data buffer.
    pub fn per_pixel(pixels: PixelBuf<'a>, kind: NoiseKind) -> Self {
        Self {
            source: NoiseSource::PerPixel(pixels),
            kind,
        }
    }
}

/// Bad-pixel mask parallel to the data buffer.
///
/// A pixel whose mask value is strictly greater than `threshold` is
/// excluded from the flux and variance sums; its overlap still counts
/// toward the total aperture area used for the lost-area correction.
#[derive(Clone, Copy, Debug)]
pub struct Mask<'a> {
    /// Per-pixel mask values.
    pub pixels: PixelBuf<'a>,
    /// Exclusion threshold.
    pub threshold: f64,
}

impl<'a> Mask<'a> {
    /// Pair mask values with an exclusion threshold.
    pub fn new(pixels: PixelBuf<'a>, threshold: f64) -> Self {
        Self { pixels, threshold }
    }
}
