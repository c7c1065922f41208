use crate::foundation::error::{ApphotError, ApphotResult};

/// Raw element type of a caller-supplied pixel buffer.
///
/// Buffers arrive as flat `&[u8]` in native byte order; the kind selects
/// the converter that turns one element into an `f64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelKind {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl PixelKind {
    /// Element size in bytes.
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Resolve an external integer type code (cfitsio numbering, as used
    /// by FITS-style pipelines) into a kind.
    ///
    /// Unrecognized codes fail with [`ApphotError::UnsupportedType`]
    /// before any pixel is read; callers resolving data, noise and mask
    /// codes in order get the first failure and no partial result.
    pub fn from_code(code: i32) -> ApphotResult<Self> {
        match code {
            11 => Ok(Self::U8),
            12 => Ok(Self::I8),
            20 => Ok(Self::U16),
            21 => Ok(Self::I16),
            30 => Ok(Self::U32),
            31 => Ok(Self::I32),
            40 => Ok(Self::U64),
            41 | 81 => Ok(Self::I64),
            42 => Ok(Self::F32),
            82 => Ok(Self::F64),
            other => Err(ApphotError::unsupported_type(format!("type code {other}"))),
        }
    }

    /// Converter for this kind. Resolved once per buffer, at view
    /// construction.
    pub(crate) fn reader(self) -> ElemReader {
        match self {
            Self::U8 => ElemReader::new(read_u8, 1),
            Self::I8 => ElemReader::new(read_i8, 1),
            Self::U16 => ElemReader::new(read_u16, 2),
            Self::I16 => ElemReader::new(read_i16, 2),
            Self::U32 => ElemReader::new(read_u32, 4),
            Self::I32 => ElemReader::new(read_i32, 4),
            Self::U64 => ElemReader::new(read_u64, 8),
            Self::I64 => ElemReader::new(read_i64, 8),
            Self::F32 => ElemReader::new(read_f32, 4),
            Self::F64 => ElemReader::new(read_f64, 8),
        }
    }
}

/// A resolved element converter: reads element `index` out of a flat
/// native-order byte buffer as `f64`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ElemReader {
    read: fn(&[u8]) -> f64,
    size: usize,
}

impl ElemReader {
    fn new(read: fn(&[u8]) -> f64, size: usize) -> Self {
        Self { read, size }
    }

    /// Convert element `index` of `bytes`.
    pub(crate) fn value(&self, bytes: &[u8], index: usize) -> f64 {
        let at = index * self.size;
        (self.read)(&bytes[at..at + self.size])
    }
}

// Caller buffers are plain `&[u8]` with no alignment guarantee, so every
// multi-byte read is unaligned.

fn read_u8(bytes: &[u8]) -> f64 {
    f64::from(bytes[0])
}

fn read_i8(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<i8>(bytes))
}

fn read_u16(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<u16>(bytes))
}

fn read_i16(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<i16>(bytes))
}

fn read_u32(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<u32>(bytes))
}

fn read_i32(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<i32>(bytes))
}

fn read_u64(bytes: &[u8]) -> f64 {
    bytemuck::pod_read_unaligned::<u64>(bytes) as f64
}

fn read_i64(bytes: &[u8]) -> f64 {
    bytemuck::pod_read_unaligned::<i64>(bytes) as f64
}

fn read_f32(bytes: &[u8]) -> f64 {
    f64::from(bytemuck::pod_read_unaligned::<f32>(bytes))
}

fn read_f64(bytes: &[u8]) -> f64 {
    bytemuck::pod_read_unaligned::<f64>(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/elem.rs"]
mod tests;
