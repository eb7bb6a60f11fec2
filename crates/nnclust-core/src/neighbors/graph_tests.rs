//! Tests for `graph` and `neighbor` modules.

use super::graph::NeighborGraph;
use super::neighbor::Neighbor;
use crate::error::Error;

fn two_by_two() -> NeighborGraph {
    // Scenario A layout with k = 1
    NeighborGraph::from_entries(
        4,
        1,
        vec![
            Neighbor::new(1, 1.0),
            Neighbor::new(0, 1.0),
            Neighbor::new(3, 1.0),
            Neighbor::new(2, 1.0),
        ],
    )
}

#[test]
fn test_neighbor_orders_by_distance_then_index() {
    let mut list = vec![
        Neighbor::new(7, 2.0),
        Neighbor::new(3, 1.0),
        Neighbor::new(1, 2.0),
        Neighbor::new(0, 5.0),
    ];
    list.sort_unstable();

    let order: Vec<usize> = list.iter().map(|nb| nb.index).collect();
    assert_eq!(order, vec![3, 1, 7, 0]);
}

#[test]
fn test_empty_slot_sorts_last() {
    assert!(Neighbor::new(usize::MAX - 1, f64::MAX) < Neighbor::EMPTY);
}

#[test]
fn test_flat_exports() {
    let graph = two_by_two();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.k(), 1);
    assert_eq!(graph.indices(), vec![1, 0, 3, 2]);
    assert_eq!(graph.distances(), vec![1.0; 4]);
    assert_eq!(graph.neighbors(2), &[Neighbor::new(3, 1.0)]);
}

#[test]
fn test_write_into_checks_lengths_before_writing() {
    let graph = two_by_two();
    let mut indices = vec![-7i64; 4];
    let mut distances = vec![-7.0; 3];

    let err = graph.write_into(&mut indices, &mut distances).unwrap_err();

    assert_eq!(
        err,
        Error::DimensionMismatch {
            expected: 4,
            actual: 3
        }
    );
    assert!(indices.iter().all(|&i| i == -7), "nothing written on failure");
}

#[test]
fn test_write_into() {
    let graph = two_by_two();
    let mut indices = vec![0i64; 4];
    let mut distances = vec![0.0; 4];

    graph
        .write_into(&mut indices, &mut distances)
        .expect("lengths match");

    assert_eq!(indices, vec![1, 0, 3, 2]);
    assert_eq!(distances, vec![1.0; 4]);
}

#[test]
fn test_nearest_neighbor_radius() {
    let graph = NeighborGraph::from_entries(
        3,
        1,
        vec![
            Neighbor::new(1, 0.5),
            Neighbor::new(0, 0.5),
            Neighbor::new(1, 4.0),
        ],
    );
    assert_eq!(graph.nearest_neighbor_radius(), 4.0);
}

#[test]
fn test_recall_identical_graphs() {
    let graph = two_by_two();
    assert_eq!(graph.recall(&graph).expect("same shape"), 1.0);
}

#[test]
fn test_recall_partial() {
    let exact = two_by_two();
    let approx = NeighborGraph::from_entries(
        4,
        1,
        vec![
            Neighbor::new(1, 1.0),
            Neighbor::new(2, 9.0),
            Neighbor::new(3, 1.0),
            Neighbor::new(1, 9.0),
        ],
    );
    assert_eq!(approx.recall(&exact).expect("same shape"), 0.5);
}

#[test]
fn test_recall_shape_mismatch() {
    let exact = two_by_two();
    let other = NeighborGraph::from_entries(2, 1, vec![Neighbor::new(1, 1.0); 2]);
    assert!(matches!(
        other.recall(&exact),
        Err(Error::DimensionMismatch { .. })
    ));
}
