//! Flow direction and flow distance grids (JSON).

use std::path::Path;

use rf_network::{FlowNetwork, GridSpec};
use serde::{Deserialize, Serialize};

use crate::ProjectResult;

/// Row-major `(lat, lon)` direction and distance grids.
///
/// Directions use the 1-8 D8 encoding; `null` or any other code marks a
/// cell outside the basin. Distances are in meters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkFile {
    pub lat0: f64,
    pub lon0: f64,
    pub nlat: usize,
    pub nlon: usize,
    pub dlatlon: f64,
    pub flow_direction: Vec<Option<i64>>,
    pub flow_distance_m: Vec<Option<f64>>,
}

impl NetworkFile {
    pub fn grid(&self) -> ProjectResult<GridSpec> {
        Ok(GridSpec::new(self.lat0, self.lon0, self.nlat, self.nlon, self.dlatlon)?)
    }

    pub fn into_network(self) -> ProjectResult<FlowNetwork> {
        let grid = self.grid()?;
        Ok(FlowNetwork::from_codes(grid, &self.flow_direction, &self.flow_distance_m)?)
    }
}

pub fn load_network(path: &Path) -> ProjectResult<FlowNetwork> {
    let content = std::fs::read_to_string(path)?;
    let file: NetworkFile = serde_json::from_str(&content)?;
    file.into_network()
}
