//! Static reservoir description.

use chrono::NaiveDate;
use rf_network::GridCell;

use crate::operation::OperatingLimits;

/// A dam and its operating envelope. Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Reservoir {
    /// Dam number from the dam table
    pub id: u32,
    pub name: String,
    /// Grid cell the dam sits in
    pub location: GridCell,
    pub limits: OperatingLimits,
    /// First day the dam regulates flow
    pub operation_start: NaiveDate,
}

impl Reservoir {
    pub fn label(&self) -> String {
        format!("dam {} ({})", self.id, self.name)
    }
}
