// Visible range domain model
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Window of a chart into the displayed sequence.
///
/// Both bounds `None` means no explicit window: the chart shows the full
/// sequence and follows the live tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRange {
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range must define both bounds or neither")]
    Incomplete,
    #[error("range bounds must not be negative")]
    Negative,
    #[error("range start {start} is after end {end}")]
    Inverted { start: usize, end: usize },
    #[error("range end {end} is outside a sequence of {len} samples")]
    OutOfBounds { end: usize, len: usize },
    #[error("range bounds must be integer indices")]
    Malformed,
}

/// Who produced a range-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOrigin {
    #[default]
    User,
    /// Echo emitted by the brush widget while applying controller-driven indices
    Programmatic,
}

impl VisibleRange {
    pub const FULL: VisibleRange = VisibleRange {
        start_index: None,
        end_index: None,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index: Some(start_index),
            end_index: Some(end_index),
        }
    }

    /// Build a range from signed request indices
    pub fn from_signed(start: Option<i64>, end: Option<i64>) -> Result<Self, RangeError> {
        match (start, end) {
            (None, None) => Ok(Self::FULL),
            (Some(s), Some(e)) => {
                let s = usize::try_from(s).map_err(|_| RangeError::Negative)?;
                let e = usize::try_from(e).map_err(|_| RangeError::Negative)?;
                Ok(Self::new(s, e))
            }
            _ => Err(RangeError::Incomplete),
        }
    }

    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.start_index.zip(self.end_index)
    }

    /// Translate both defined bounds forward by `diff`
    pub fn shifted(&self, diff: usize) -> Self {
        Self {
            start_index: self.start_index.map(|s| s + diff),
            end_index: self.end_index.map(|e| e + diff),
        }
    }

    pub fn spans_all(&self, len: usize) -> bool {
        len > 0 && self.bounds() == Some((0, len - 1))
    }

    /// Check the range against a displayed sequence of `len` samples
    pub fn validate(&self, len: usize) -> Result<(), RangeError> {
        match (self.start_index, self.end_index) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) => {
                if start > end {
                    Err(RangeError::Inverted { start, end })
                } else if end >= len {
                    Err(RangeError::OutOfBounds { end, len })
                } else {
                    Ok(())
                }
            }
            _ => Err(RangeError::Incomplete),
        }
    }
}
