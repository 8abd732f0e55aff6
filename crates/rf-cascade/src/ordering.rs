//! Upstream-before-downstream ordering of dams.

use rf_network::{CellIndex, FlowNetwork};
use rf_reservoir::Reservoir;
use tracing::warn;

use crate::error::{CascadeError, CascadeResult};
use crate::options::OrderingPolicy;

/// Grid cell of each reservoir, `None` when it is off the grid.
pub(crate) fn resolve_cells(reservoirs: &[Reservoir], network: &FlowNetwork) -> Vec<Option<CellIndex>> {
    reservoirs
        .iter()
        .map(|r| network.grid().locate(r.location))
        .collect()
}

/// `upstream[i]` lists the reservoirs whose downstream path passes through
/// reservoir `i`'s cell.
fn upstream_sets(cells: &[Option<CellIndex>], network: &FlowNetwork) -> CascadeResult<Vec<Vec<usize>>> {
    let mut upstream = vec![Vec::new(); cells.len()];
    for (j, cell) in cells.iter().enumerate() {
        let Some(cell) = cell else { continue };
        let path = network.downstream_path(*cell)?;
        for (i, other) in cells.iter().enumerate() {
            if let Some(other) = other {
                if path.iter().any(|reach| reach.cell == *other) {
                    upstream[i].push(j);
                }
            }
        }
    }
    Ok(upstream)
}

/// Check that no dam is listed before a dam upstream of it.
pub fn check_ordering(
    reservoirs: &[Reservoir],
    network: &FlowNetwork,
    policy: OrderingPolicy,
) -> CascadeResult<()> {
    if policy == OrderingPolicy::Ignore {
        return Ok(());
    }
    let cells = resolve_cells(reservoirs, network);
    let upstream = upstream_sets(&cells, network)?;

    for (i, ups) in upstream.iter().enumerate() {
        for &j in ups.iter().filter(|&&j| j > i) {
            let (dam, up) = (&reservoirs[i], &reservoirs[j]);
            match policy {
                OrderingPolicy::Strict => {
                    return Err(CascadeError::OrderingViolation {
                        dam: dam.id,
                        upstream: up.id,
                    });
                }
                _ => warn!(
                    dam = dam.id,
                    upstream = up.id,
                    "dam runs before a dam upstream of it"
                ),
            }
        }
    }
    Ok(())
}

/// Stable topological reordering: every dam after all dams upstream of it,
/// otherwise keeping the given order.
pub fn order_upstream_first(reservoirs: &[Reservoir], network: &FlowNetwork) -> CascadeResult<Vec<Reservoir>> {
    let cells = resolve_cells(reservoirs, network);
    let upstream = upstream_sets(&cells, network)?;
    Ok(topological_order(&upstream)?
        .into_iter()
        .map(|i| reservoirs[i].clone())
        .collect())
}

/// Indices ordered so each comes after everything in its `upstream` list,
/// lowest index first among the ready ones.
fn topological_order(upstream: &[Vec<usize>]) -> CascadeResult<Vec<usize>> {
    let mut placed = vec![false; upstream.len()];
    let mut order = Vec::with_capacity(upstream.len());
    while order.len() < upstream.len() {
        // an acyclic grid always leaves some dam with every upstream dam placed
        let next = (0..upstream.len())
            .find(|&i| !placed[i] && upstream[i].iter().all(|&j| placed[j]))
            .ok_or(CascadeError::Invariant {
                what: "dams upstream of each other",
            })?;
        placed[next] = true;
        order.push(next);
    }
    Ok(order)
}
