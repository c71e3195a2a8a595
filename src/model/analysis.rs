// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static analyses over a recorded wiring topology.
//!
//! These are pure functions of the vertex and edge lists. The model logs whatever
//! they find; nothing here fails.

use crate::model::{ModelEdge, ModelVertex};
use crate::schedulers::TaskSchedulerType;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// Every cycle in the subgraph of edges that apply backpressure.
///
/// Each back edge found by a depth-first search yields one cycle, reported as the
/// path from the revisited scheduler back to itself (`["a", "b", "a"]`). Vertices
/// and neighbours are visited in name order so the result is deterministic.
pub fn find_backpressure_cycles(vertices: &[ModelVertex], edges: &[ModelEdge]) -> Vec<Vec<String>> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for vertex in vertices {
        graph.entry(vertex.name.as_str()).or_default();
    }
    for edge in edges.iter().filter(|edge| edge.applies_backpressure) {
        graph
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.destination.as_str());
        graph.entry(edge.destination.as_str()).or_default();
    }

    let mut colours: HashMap<&str, Colour> = graph.keys().map(|name| (*name, Colour::White)).collect();
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for &start in graph.keys() {
        if colours.get(start) == Some(&Colour::White) {
            visit(start, &graph, &mut colours, &mut path, &mut cycles);
        }
    }
    cycles
}

fn visit<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    colours: &mut HashMap<&'a str, Colour>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    colours.insert(node, Colour::Grey);
    path.push(node);

    if let Some(neighbours) = graph.get(node) {
        for &neighbour in neighbours {
            match colours.get(neighbour).copied().unwrap_or(Colour::White) {
                Colour::White => visit(neighbour, graph, colours, path, cycles),
                Colour::Grey => {
                    // The grey node is on the current path.
                    if let Some(start) = path.iter().position(|on_path| *on_path == neighbour) {
                        let mut cycle: Vec<String> = path[start..].iter().map(|name| name.to_string()).collect();
                        cycle.push(neighbour.to_string());
                        cycles.push(cycle);
                    }
                }
                Colour::Black => {}
            }
        }
    }

    path.pop();
    colours.insert(node, Colour::Black);
}

/// Direct schedulers fed from more than one independent calling context.
///
/// A direct or direct-stateless scheduler runs on its caller's task, so the calling
/// contexts of a direct scheduler are the queued schedulers found by walking its
/// incoming edges backwards through any direct schedulers in between. A `Direct`
/// scheduler with two or more distinct contexts can have its handler entered
/// concurrently. `DirectStateless` schedulers are never reported.
///
/// Returns `(scheduler, sorted calling contexts)` in scheduler name order.
pub fn find_illegal_direct_usage(
    vertices: &[ModelVertex],
    edges: &[ModelEdge],
) -> Vec<(String, Vec<String>)> {
    let types: HashMap<&str, TaskSchedulerType> = vertices
        .iter()
        .map(|vertex| (vertex.name.as_str(), vertex.scheduler_type))
        .collect();

    let mut incoming: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in edges {
        incoming
            .entry(edge.destination.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }

    let mut direct: Vec<&str> = vertices
        .iter()
        .filter(|vertex| vertex.scheduler_type == TaskSchedulerType::Direct)
        .map(|vertex| vertex.name.as_str())
        .collect();
    direct.sort_unstable();

    let mut findings = Vec::new();
    for scheduler in direct {
        let contexts = calling_contexts(scheduler, &types, &incoming);
        if contexts.len() > 1 {
            findings.push((scheduler.to_string(), contexts.into_iter().map(str::to_string).collect()));
        }
    }
    findings
}

fn calling_contexts<'a>(
    scheduler: &'a str,
    types: &HashMap<&'a str, TaskSchedulerType>,
    incoming: &HashMap<&'a str, BTreeSet<&'a str>>,
) -> BTreeSet<&'a str> {
    let mut contexts = BTreeSet::new();
    let mut seen = BTreeSet::from([scheduler]);
    let mut pending = VecDeque::from([scheduler]);

    while let Some(current) = pending.pop_front() {
        let Some(sources) = incoming.get(current) else {
            continue;
        };
        for &source in sources {
            if !seen.insert(source) {
                continue;
            }
            match types.get(source) {
                Some(scheduler_type) if scheduler_type.is_direct() => pending.push_back(source),
                _ => {
                    contexts.insert(source);
                }
            }
        }
    }
    contexts
}

/// Input wires without a handler, formatted `scheduler.label` and sorted.
pub fn find_unbound_input_wires(unbound: &[(String, String)]) -> Vec<String> {
    let mut wires: Vec<String> = unbound
        .iter()
        .map(|(scheduler, label)| format!("{}.{}", scheduler, label))
        .collect();
    wires.sort();
    wires
}
