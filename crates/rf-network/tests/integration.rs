//! Integration tests for rf-network.

use proptest::prelude::*;
use rf_network::validate::find_cycle;
use rf_network::{FlowNetwork, GridCell, GridSpec, NetworkError, NextCell};
use uom::si::length::meter;

/// 4 x 4 eighth-degree basin draining to the south-east corner.
///
/// ```text
/// row 3:  4  5  5  6
/// row 2:  3  4  5  6
/// row 1:  3  3  4  5
/// row 0:  3  3  3  0   <- (0,3) has no direction: basin edge
/// ```
fn basin() -> FlowNetwork {
    let grid = GridSpec::new(35.0625, -84.4375, 4, 4, 0.125).unwrap();
    #[rustfmt::skip]
    let codes = [
        Some(3), Some(3), Some(3), Some(0),
        Some(3), Some(3), Some(4), Some(5),
        Some(3), Some(4), Some(5), Some(6),
        Some(4), Some(5), Some(5), Some(6),
    ];
    let distances: Vec<Option<f64>> = (0..16).map(|i| Some(10_000.0 + i as f64)).collect();
    FlowNetwork::from_codes(grid, &codes, &distances).unwrap()
}

#[test]
fn path_from_headwater_reaches_edge() {
    let net = basin();
    let g = *net.grid();
    let headwater = g.locate(GridCell::new(35.4375, -84.4375)).unwrap(); // (3,0)
    let path = net.downstream_path(headwater).unwrap();

    // (3,0) SE-> (2,1) SE-> (1,2) SE-> (0,3), which has no direction
    let cells: Vec<(usize, usize)> = path.iter().map(|r| g.row_col(r.cell)).collect();
    assert_eq!(cells, vec![(2, 1), (1, 2)]);

    // distances accumulate the value stored at each reached cell
    let expected = [10_009.0, 10_009.0 + 10_006.0];
    for (reach, want) in path.iter().zip(expected) {
        assert!((reach.distance.get::<meter>() - want).abs() < 1e-9);
    }
}

#[test]
fn off_grid_neighbour_is_outlet() {
    let net = basin();
    let g = *net.grid();
    // (1,3) points S into (0,3) which has no direction
    assert_eq!(net.next_cell(g.index_of(1, 3).unwrap()), NextCell::Outlet);
    // (0,2) points E to (0,3): edge cell, outlet as well
    assert_eq!(net.next_cell(g.index_of(0, 2).unwrap()), NextCell::Outlet);
}

#[test]
fn distance_to_next_reads_neighbour() {
    let net = basin();
    let g = *net.grid();
    let d = net.distance_to_next(g.index_of(0, 0).unwrap()).unwrap();
    assert_eq!(d.get::<meter>(), 10_001.0); // (0,1) is index 1
}

#[test]
fn cycle_does_not_hang() {
    // 2 x 2 ring: (0,0) N-> (1,0) E-> (1,1) S-> (0,1) W-> (0,0)
    let grid = GridSpec::new(0.0, 0.0, 2, 2, 1.0).unwrap();
    let net = FlowNetwork::from_codes(
        grid,
        &[Some(1), Some(7), Some(3), Some(5)],
        &[Some(1.0); 4],
    )
    .unwrap();
    let err = net.downstream_path(grid.index_of(0, 0).unwrap()).unwrap_err();
    assert!(matches!(err, NetworkError::CycleDetected { steps: 4, .. }));
}

#[test]
fn shape_mismatch_on_construction() {
    let grid = GridSpec::new(0.0, 0.0, 2, 2, 1.0).unwrap();
    let err = FlowNetwork::from_codes(grid, &[Some(1); 3], &[Some(1.0); 4]).unwrap_err();
    assert!(matches!(err, NetworkError::ShapeMismatch { .. }));
}

proptest! {
    #[test]
    fn traversal_terminates_or_reports_cycle(codes in prop::collection::vec(0_i64..=9, 25)) {
        let grid = GridSpec::new(0.0, 0.0, 5, 5, 1.0).unwrap();
        let codes: Vec<Option<i64>> = codes.into_iter().map(Some).collect();
        let net = FlowNetwork::from_codes(grid, &codes, &[Some(500.0); 25]).unwrap();
        let has_cycle = find_cycle(&net).is_some();
        let mut any_err = false;
        for i in 0..25 {
            match net.downstream_path(rf_network::CellIndex::new(i)) {
                Ok(path) => prop_assert!(path.len() < 25),
                Err(NetworkError::CycleDetected { .. }) => any_err = true,
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }
        prop_assert_eq!(has_cycle, any_err);
    }
}
