//! Measurement Record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size and runtime recorded for one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Composite combination label
    pub label: String,
    /// Byte size of the stripped library artifact
    pub size_bytes: u64,
    /// Wall-clock benchmark runtime in seconds
    pub elapsed_secs: f64,
}

impl Measurement {
    /// Create a measurement record
    pub fn new(label: impl Into<String>, size_bytes: u64, elapsed_secs: f64) -> Self {
        Self {
            label: label.into(),
            size_bytes,
            elapsed_secs,
        }
    }
}

/// `label size seconds`, space separated; seconds always carry a fraction
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.label, self.size_bytes, self.elapsed_secs)
    }
}
