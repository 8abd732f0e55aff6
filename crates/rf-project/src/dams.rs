//! Dam table (CSV) loading.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rf_core::{Flow, Volume};
use rf_network::GridCell;
use rf_reservoir::{OperatingLimits, Reservoir};
use serde::{Deserialize, Serialize};

use crate::validate::validate_dams;
use crate::{ProjectError, ProjectResult};

/// One row of the dam table, with the table's column names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DamRecord {
    pub dam_number: u32,
    pub dam_name: String,
    pub grid_lat: f64,
    pub grid_lon: f64,
    pub top_vol_acre_feet: f64,
    pub bot_vol_acre_feet: f64,
    pub max_flow_cfs: f64,
    pub min_flow_cfs: f64,
    #[serde(rename = "year_operated_start_of_Calendar_year")]
    pub year_operated: i32,
}

impl DamRecord {
    pub fn to_reservoir(&self) -> ProjectResult<Reservoir> {
        let limits = OperatingLimits::new(
            Volume::from_acre_feet(self.top_vol_acre_feet),
            Volume::from_acre_feet(self.bot_vol_acre_feet),
            Flow::from_cfs(self.max_flow_cfs),
            Flow::from_cfs(self.min_flow_cfs),
        )?;
        let operation_start =
            NaiveDate::from_ymd_opt(self.year_operated, 1, 1).ok_or_else(|| ProjectError::InvalidInput {
                what: format!("dam {}: year {} out of range", self.dam_number, self.year_operated),
            })?;
        Ok(Reservoir {
            id: self.dam_number,
            name: self.dam_name.clone(),
            location: GridCell::new(self.grid_lat, self.grid_lon),
            limits,
            operation_start,
        })
    }
}

/// Parse a dam table; rows keep file order.
pub fn read_dam_table<R: Read>(reader: R) -> ProjectResult<Vec<Reservoir>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut reservoirs = Vec::new();
    for result in rdr.deserialize() {
        let record: DamRecord = result?;
        reservoirs.push(record.to_reservoir()?);
    }
    validate_dams(&reservoirs)?;
    Ok(reservoirs)
}

pub fn load_dam_table(path: &Path) -> ProjectResult<Vec<Reservoir>> {
    let file = std::fs::File::open(path)?;
    read_dam_table(file)
}
