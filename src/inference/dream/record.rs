//! Fantasy records

use crate::runtime::datum::Datum;
use crate::trace::trace::Trace;

/// Output of one fantasy run: the choice log and the fantasized dataset
///
/// `data` holds one datum per element visited by the bulk-data construct,
/// in visiting order.
#[derive(Clone, Debug, Default)]
pub struct Record {
    /// Every latent choice and fantasized observation, in program order
    pub trace: Trace,
    /// Fantasized data
    pub data: Vec<Datum>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fantasized data points
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no data was fantasized
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
