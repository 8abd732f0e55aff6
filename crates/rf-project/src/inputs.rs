//! Everything a run reads, loaded from a validated configuration.

use std::path::{Path, PathBuf};

use rf_network::FlowNetwork;
use rf_reservoir::Reservoir;
use rf_routing::FlowField;
use tracing::info;

use crate::dams::load_dam_table;
use crate::flow_file::load_flow_field;
use crate::network_file::load_network;
use crate::rule_curves::DirectoryRuleCurves;
use crate::schema::{OrderingDef, RunConfig};
use crate::ProjectResult;

pub struct RunInputs {
    /// Dams in cascade order
    pub reservoirs: Vec<Reservoir>,
    pub rule_curves: DirectoryRuleCurves,
    pub network: FlowNetwork,
    pub field: FlowField,
}

/// Load the dam table, network and flow field named by `config`.
///
/// Relative paths resolve against `base_dir`. With `ordering: auto` the dam
/// table is reordered upstream-first.
pub fn load_inputs(config: &RunConfig, base_dir: &Path) -> ProjectResult<RunInputs> {
    let paths = config.resolve_paths(base_dir);

    let mut reservoirs = load_dam_table(&paths.dam_table)?;
    let network = load_network(&paths.network)?;
    let field = load_flow_field(
        &paths.flow,
        network.cell_count(),
        config.input.units,
        config.input.drop_last_day,
    )?;

    if config.options.ordering == OrderingDef::Auto {
        reservoirs = rf_cascade::order_upstream_first(&reservoirs, &network)?;
    }

    info!(
        dams = reservoirs.len(),
        cells = network.cell_count(),
        "loaded run inputs"
    );

    Ok(RunInputs {
        reservoirs,
        rule_curves: DirectoryRuleCurves::new(paths.rule_curve_dir),
        network,
        field,
    })
}

/// Every input file a run depends on, in a stable order. Rule curves that
/// do not exist are left out.
pub fn input_files(config: &RunConfig, base_dir: &Path) -> ProjectResult<Vec<PathBuf>> {
    let paths = config.resolve_paths(base_dir);
    let reservoirs = load_dam_table(&paths.dam_table)?;
    let curves = DirectoryRuleCurves::new(&paths.rule_curve_dir);

    let mut files = vec![paths.dam_table.clone(), paths.network.clone(), paths.flow.clone()];
    files.extend(
        reservoirs
            .iter()
            .map(|r| curves.path_for(r))
            .filter(|p| p.is_file()),
    );
    Ok(files)
}
