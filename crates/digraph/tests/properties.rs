//! Property tests: arbitrary mutation sequences keep the graph consistent.

use digraph::{Distance, EdgeId, Graph, GraphError, NodeId};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const LABELS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

#[derive(Debug, Clone)]
enum Op {
    AddNode(u64, usize),
    AddEdge(u64, usize, usize, i64),
    DelNode(usize),
    DelEdge(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    let label = 0..LABELS.len();
    prop_oneof![
        (0u64..8, label.clone()).prop_map(|(id, l)| Op::AddNode(id, l)),
        (0u64..12, label.clone(), label.clone(), 0i64..20)
            .prop_map(|(id, from, to, w)| Op::AddEdge(id, from, to, w)),
        label.clone().prop_map(Op::DelNode),
        (label.clone(), label).prop_map(|(from, to)| Op::DelEdge(from, to)),
    ]
}

/// Plain reference model: label -> node id, (from, to) -> edge id.
#[derive(Debug, Default)]
struct Model {
    nodes: BTreeMap<&'static str, u64>,
    edges: BTreeMap<(&'static str, &'static str), u64>,
}

impl Model {
    fn apply(&mut self, op: &Op) -> bool {
        match *op {
            Op::AddNode(id, l) => {
                let label = LABELS[l];
                if self.nodes.values().any(|&v| v == id) || self.nodes.contains_key(label) {
                    return false;
                }
                self.nodes.insert(label, id);
                true
            }
            Op::AddEdge(id, f, t, _) => {
                let (from, to) = (LABELS[f], LABELS[t]);
                if self.edges.values().any(|&v| v == id)
                    || !self.nodes.contains_key(from)
                    || !self.nodes.contains_key(to)
                    || self.edges.contains_key(&(from, to))
                {
                    return false;
                }
                self.edges.insert((from, to), id);
                true
            }
            Op::DelNode(l) => {
                let label = LABELS[l];
                if self.nodes.remove(label).is_none() {
                    return false;
                }
                self.edges.retain(|&(from, to), _| from != label && to != label);
                true
            }
            Op::DelEdge(f, t) => self.edges.remove(&(LABELS[f], LABELS[t])).is_some(),
        }
    }
}

fn run(graph: &mut Graph, op: &Op) -> Result<(), GraphError> {
    match *op {
        Op::AddNode(id, l) => graph.add_node(NodeId(id), LABELS[l]),
        Op::AddEdge(id, f, t, w) => graph.add_edge(EdgeId(id), LABELS[f], LABELS[t], w, None),
        Op::DelNode(l) => graph.del_node(LABELS[l]),
        Op::DelEdge(f, t) => graph.del_edge(LABELS[f], LABELS[t]),
    }
}

fn assert_matches_model(graph: &Graph, model: &Model) {
    assert_eq!(graph.num_nodes(), model.nodes.len());
    assert_eq!(graph.num_edges(), model.edges.len());

    let labels: BTreeSet<&str> = graph.labels().collect();
    let expected: BTreeSet<&str> = model.nodes.keys().copied().collect();
    assert_eq!(labels, expected);

    for (&label, &id) in &model.nodes {
        assert_eq!(graph.node(label).map(|n| n.id), Some(NodeId(id)));
    }
    for (&(from, to), &id) in &model.edges {
        assert_eq!(graph.edge(from, to).map(|e| e.id), Some(EdgeId(id)));
    }
    // every edge endpoint is a live node
    for label in graph.labels() {
        for next in graph.successors(label).unwrap() {
            assert!(graph.contains_node(next));
        }
    }
}

proptest! {
    #[test]
    fn mutations_agree_with_reference_model(ops in prop::collection::vec(op(), 0..60)) {
        let mut graph = Graph::new();
        let mut model = Model::default();

        for op in &ops {
            let accepted = run(&mut graph, op).is_ok();
            prop_assert_eq!(accepted, model.apply(op), "disagreement on {:?}", op);
        }

        assert_matches_model(&graph, &model);
    }

    #[test]
    fn topo_order_respects_every_edge(ops in prop::collection::vec(op(), 0..60)) {
        let mut graph = Graph::new();
        for op in &ops {
            let _ = run(&mut graph, op);
        }

        match graph.topo_sort() {
            Ok(order) => {
                prop_assert_eq!(order.len(), graph.num_nodes());
                let position = |l: &str| order.iter().position(|o| o == l).unwrap();
                for label in graph.labels() {
                    for next in graph.successors(label).unwrap() {
                        prop_assert!(position(label) < position(next));
                    }
                }
            }
            Err(GraphError::CycleDetected { cycle }) => {
                prop_assert!(cycle.len() >= 2);
                prop_assert_eq!(cycle.first(), cycle.last());
                for pair in cycle.windows(2) {
                    prop_assert!(graph.edge(&pair[0], &pair[1]).is_some());
                }
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn shortest_distances_are_consistent(
        ops in prop::collection::vec(op(), 0..60),
        source in 0..LABELS.len(),
    ) {
        let mut graph = Graph::new();
        for op in &ops {
            let _ = run(&mut graph, op);
        }
        let source = LABELS[source];
        prop_assume!(graph.contains_node(source));

        let paths = graph.shortest_path(source).unwrap();

        prop_assert_eq!(paths.len(), graph.num_nodes());
        prop_assert_eq!(paths.distance(source), Some(Distance::ZERO));
        // no edge can improve a settled distance when weights are non-negative
        for label in graph.labels() {
            let Some(Distance::Finite(here)) = paths.distance(label) else {
                continue;
            };
            for next in graph.successors(label).unwrap() {
                let weight = graph.edge(label, next).unwrap().weight;
                let there = paths.distance(next).unwrap();
                prop_assert!(there <= Distance::Finite(here + weight));
            }
        }
        // every finite distance is the weight of the path that produced it
        for label in graph.labels() {
            let Some(Distance::Finite(expected)) = paths.distance(label) else {
                continue;
            };
            let path = paths.path_to(label);
            prop_assert!(path.is_some(), "no path to reachable {}", label);
            let path = path.unwrap();
            prop_assert_eq!(path.first().map(String::as_str), Some(source));
            prop_assert_eq!(path.last().map(String::as_str), Some(label));
            let mut total = 0;
            for hop in path.windows(2) {
                let edge = graph.edge(&hop[0], &hop[1]);
                prop_assert!(edge.is_some(), "{} -> {} is not an edge", hop[0], hop[1]);
                total += edge.unwrap().weight;
            }
            prop_assert_eq!(total, expected);
        }
        prop_assert_eq!(&paths, &graph.shortest_path(source).unwrap());
    }
}
