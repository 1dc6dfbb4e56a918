use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("region rows {rows:?} x cols {cols:?} out of bounds for {width}x{height} image")]
    OutOfBounds {
        rows: (usize, usize),
        cols: (usize, usize),
        width: usize,
        height: usize,
    },
    #[error("invalid stride")]
    InvalidStride,
    #[error("empty or inverted range {lo}..{hi}")]
    InvalidRange { lo: usize, hi: usize },
}
