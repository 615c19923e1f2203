//! Testing utilities for SGU workspace
//!
//! Shared model fixtures for uniqueness and deduplication tests.

#![allow(missing_docs)]

use sgu_model::{Container, DefinitionId, Geometry, InstanceId, SceneGraph, Transform};

/// The furniture showroom fixture.
///
/// Two tables share their leg and foot definitions:
///
/// - `Table`: one root placement, containing a board and 4 legs
/// - `Table#1`: an independent second table, its own board/leg placements
///   but the *same* board, leg and foot definitions
/// - `leg`: contains one `foot` child instance
/// - `vase`: two root placements, no children
/// - `Stacy`: one root placement, already unique
///
/// Seven definitions in total; making the first table deeply unique clones
/// board, leg and foot exactly once each (ten definitions after).
pub struct TableModel {
    pub graph: SceneGraph,

    pub table_def: DefinitionId,
    pub table2_def: DefinitionId,
    pub board_def: DefinitionId,
    pub leg_def: DefinitionId,
    pub foot_def: DefinitionId,
    pub vase_def: DefinitionId,
    pub stacy_def: DefinitionId,

    /// Root placement of `Table`
    pub table1: InstanceId,
    /// Root placement of `Table#1`
    pub table2: InstanceId,
    /// Board placement inside `Table`
    pub board_in_table1: InstanceId,
    /// The 4 leg placements inside `Table`
    pub legs_in_table1: Vec<InstanceId>,
    /// The 4 leg placements inside `Table#1`
    pub legs_in_table2: Vec<InstanceId>,
    /// The single foot placement inside `leg`
    pub foot_in_leg: InstanceId,
    /// The two root vase placements
    pub vases: Vec<InstanceId>,
    /// Root placement of `Stacy`
    pub stacy: InstanceId,
}

impl TableModel {
    pub fn build() -> Self {
        let mut graph = SceneGraph::new();

        let foot_def = graph.add_definition("foot", Geometry::labeled("foot mesh"));
        let leg_def = graph.add_definition("leg", Geometry::labeled("leg mesh"));
        let board_def = graph.add_definition("board", Geometry::labeled("board mesh"));
        let table_def = graph.add_definition("Table", Geometry::labeled("table"));
        let table2_def = graph.add_definition("Table#1", Geometry::labeled("table"));
        let vase_def = graph.add_definition("vase", Geometry::labeled("vase mesh"));
        let stacy_def = graph.add_definition("Stacy", Geometry::labeled("person"));

        let foot_in_leg = graph
            .add_instance(
                foot_def,
                Container::Definition(leg_def),
                Transform::translation(0.0, 0.0, -0.7),
            )
            .unwrap();

        let board_in_table1 = graph
            .add_instance(
                board_def,
                Container::Definition(table_def),
                Transform::translation(0.0, 0.0, 0.7),
            )
            .unwrap();
        graph
            .add_instance(
                board_def,
                Container::Definition(table2_def),
                Transform::translation(0.0, 0.0, 0.7),
            )
            .unwrap();

        let corners = [(-0.4, -0.4), (0.4, -0.4), (0.4, 0.4), (-0.4, 0.4)];
        let legs_in_table1 = corners
            .iter()
            .map(|&(x, y)| {
                graph
                    .add_instance(
                        leg_def,
                        Container::Definition(table_def),
                        Transform::translation(x, y, 0.0),
                    )
                    .unwrap()
            })
            .collect();
        let legs_in_table2 = corners
            .iter()
            .map(|&(x, y)| {
                graph
                    .add_instance(
                        leg_def,
                        Container::Definition(table2_def),
                        Transform::translation(x, y, 0.0),
                    )
                    .unwrap()
            })
            .collect();

        let table1 = graph
            .add_instance(table_def, Container::Root, Transform::IDENTITY)
            .unwrap();
        let table2 = graph
            .add_instance(table2_def, Container::Root, Transform::translation(3.0, 0.0, 0.0))
            .unwrap();

        let vases = (0..2)
            .map(|n| {
                graph
                    .add_instance(
                        vase_def,
                        Container::Root,
                        Transform::translation(f64::from(n), 5.0, 0.0),
                    )
                    .unwrap()
            })
            .collect();

        let stacy = graph
            .add_instance(stacy_def, Container::Root, Transform::translation(-2.0, 0.0, 0.0))
            .unwrap();

        Self {
            graph,
            table_def,
            table2_def,
            board_def,
            leg_def,
            foot_def,
            vase_def,
            stacy_def,
            table1,
            table2,
            board_in_table1,
            legs_in_table1,
            legs_in_table2,
            foot_in_leg,
            vases,
            stacy,
        }
    }
}

impl Default for TableModel {
    fn default() -> Self {
        Self::build()
    }
}

/// A chain of definitions where `counts[k]` placements of layer `k` sit
/// inside layer `k - 1` (layer 0 placements sit at the root). Returns the
/// graph and the deepest definition; the number of root-to-leaf routes is
/// the product of `counts`.
pub fn layered_model(counts: &[usize]) -> (SceneGraph, DefinitionId) {
    let mut graph = SceneGraph::new();
    let mut previous: Option<DefinitionId> = None;
    let mut deepest = graph.add_definition("layer-0", Geometry::default());
    for (level, &count) in counts.iter().enumerate() {
        let definition = if level == 0 {
            deepest
        } else {
            graph.add_definition(format!("layer-{level}"), Geometry::default())
        };
        let container = match previous {
            None => Container::Root,
            Some(parent) => Container::Definition(parent),
        };
        for _ in 0..count {
            graph
                .add_instance(definition, container, Transform::IDENTITY)
                .unwrap();
        }
        previous = Some(definition);
        deepest = definition;
    }
    (graph, deepest)
}
