//! rf-project: run configuration format, validation and input loading.

pub mod dams;
pub mod flow_file;
pub mod inputs;
pub mod network_file;
pub mod rule_curves;
pub mod schema;
pub mod validate;

pub use dams::{DamRecord, load_dam_table, read_dam_table};
pub use flow_file::{FlowFile, load_flow_field};
pub use inputs::{RunInputs, input_files, load_inputs};
pub use network_file::{NetworkFile, load_network};
pub use rule_curves::{DirectoryRuleCurves, load_rule_curve, parse_rule_curve, rule_curve_file_name};
pub use schema::*;
pub use validate::{ValidationError, validate_config, validate_dams};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Parse error on line {line}: {what}")]
    Parse { line: usize, what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Network error: {0}")]
    Network(#[from] rf_network::NetworkError),

    #[error("Reservoir error: {0}")]
    Reservoir(#[from] rf_reservoir::ReservoirError),

    #[error("Flow field error: {0}")]
    Routing(#[from] rf_routing::RoutingError),

    #[error("Cascade error: {0}")]
    Cascade(#[from] rf_cascade::CascadeError),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_yaml(path: &std::path::Path, config: &RunConfig) -> ProjectResult<()> {
    validate_config(config)?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
