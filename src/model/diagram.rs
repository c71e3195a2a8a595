// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mermaid flowchart rendering of a wiring topology.
//!
//! Output is deterministic for a given topology: ungrouped schedulers and edges are
//! emitted in name order, groups, substitutions and manual links in the order the
//! caller gave them. Solid arrows are edges that apply backpressure, dotted arrows
//! are edges that do not.

use crate::model::{ModelEdge, ModelVertex};
use crate::schedulers::TaskSchedulerType;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A named set of schedulers drawn together. A collapsed group is drawn as a
/// single node and edges between its members are hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGroup {
    pub name: String,
    pub elements: BTreeSet<String>,
    pub collapse: bool,
}

impl ModelGroup {
    pub fn new<S: Into<String>>(name: impl Into<String>, elements: impl IntoIterator<Item = S>, collapse: bool) -> Self {
        Self {
            name: name.into(),
            elements: elements.into_iter().map(Into::into).collect(),
            collapse,
        }
    }

    fn id(&self) -> String {
        let sanitized: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        format!("group_{}", sanitized)
    }
}

/// Replaces every edge leaving `source` through input wires labelled `label` with
/// a fan-out from a single named node. Used to unclutter edges that go everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEdgeSubstitution {
    pub source: String,
    pub label: String,
    pub substitution: String,
}

/// An edge that exists for documentation only and is not backed by a wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelManualLink {
    pub source: String,
    pub label: String,
    pub target: String,
}

fn node(vertex: &ModelVertex) -> String {
    let name = &vertex.name;
    match vertex.scheduler_type {
        TaskSchedulerType::Sequential => format!("{name}[{name}]"),
        TaskSchedulerType::Concurrent => format!("{name}[[{name}]]"),
        TaskSchedulerType::Direct => format!("{name}[/{name}/]"),
        TaskSchedulerType::DirectStateless => format!("{name}{{{{{name}}}}}"),
    }
}

fn arrow(edge: &ModelEdge) -> &'static str {
    if edge.applies_backpressure {
        "-->"
    } else {
        "-.->"
    }
}

pub fn render(
    vertices: &[ModelVertex],
    edges: &[ModelEdge],
    groups: &[ModelGroup],
    substitutions: &[ModelEdgeSubstitution],
    manual_links: &[ModelManualLink],
) -> String {
    let mut sorted_vertices: Vec<&ModelVertex> = vertices.iter().collect();
    sorted_vertices.sort_by(|a, b| a.name.cmp(&b.name));

    // Scheduler name -> index of the first group that claims it.
    let mut membership: HashMap<&str, usize> = HashMap::new();
    for (index, group) in groups.iter().enumerate() {
        for vertex in &sorted_vertices {
            if group.elements.contains(&vertex.name) {
                membership.entry(vertex.name.as_str()).or_insert(index);
            }
        }
    }

    let group_ids: Vec<String> = groups.iter().map(ModelGroup::id).collect();
    let endpoint = |name: &str| -> String {
        match membership.get(name) {
            Some(&index) if groups[index].collapse => group_ids[index].clone(),
            _ => name.to_string(),
        }
    };

    let mut lines = vec!["flowchart TD".to_string()];

    for vertex in sorted_vertices.iter().filter(|v| !membership.contains_key(v.name.as_str())) {
        lines.push(format!("    {}", node(vertex)));
    }

    for (index, group) in groups.iter().enumerate() {
        let id = &group_ids[index];
        if group.collapse {
            lines.push(format!("    {}([\"{}\"])", id, group.name));
            continue;
        }
        lines.push(format!("    subgraph {}[\"{}\"]", id, group.name));
        for vertex in sorted_vertices
            .iter()
            .filter(|v| membership.get(v.name.as_str()) == Some(&index))
        {
            lines.push(format!("        {}", node(vertex)));
        }
        lines.push("    end".to_string());
    }

    let mut sorted_edges: Vec<&ModelEdge> = edges.iter().collect();
    sorted_edges.sort_by(|a, b| {
        (&a.source, &a.destination, &a.label).cmp(&(&b.source, &b.destination, &b.label))
    });

    let mut substituted = vec![false; sorted_edges.len()];
    for (k, substitution) in substitutions.iter().enumerate() {
        let matched: Vec<usize> = sorted_edges
            .iter()
            .enumerate()
            .filter(|(i, edge)| {
                !substituted[*i] && edge.source == substitution.source && edge.label == substitution.label
            })
            .map(|(i, _)| i)
            .collect();
        if matched.is_empty() {
            continue;
        }

        lines.push(format!("    sub_{}_src((\"{}\"))", k, substitution.substitution));
        lines.push(format!("    {} --> sub_{}_src", endpoint(&substitution.source), k));
        for (j, &i) in matched.iter().enumerate() {
            let edge = sorted_edges[i];
            substituted[i] = true;
            lines.push(format!("    sub_{}_{}((\"{}\"))", k, j, substitution.substitution));
            lines.push(format!("    sub_{}_{} {} {}", k, j, arrow(edge), endpoint(&edge.destination)));
        }
    }

    let mut emitted = HashSet::new();
    for (i, edge) in sorted_edges.iter().enumerate() {
        if substituted[i] {
            continue;
        }
        let source = endpoint(&edge.source);
        let destination = endpoint(&edge.destination);
        if source == destination && source != edge.source {
            // Both ends inside the same collapsed group.
            continue;
        }
        let line = format!("    {} {}|\"{}\"| {}", source, arrow(edge), edge.label, destination);
        if emitted.insert(line.clone()) {
            lines.push(line);
        }
    }

    for link in manual_links {
        lines.push(format!(
            "    {} -.->|\"{}\"| {}",
            endpoint(&link.source),
            link.label,
            endpoint(&link.target)
        ));
    }

    let mut diagram = lines.join("\n");
    diagram.push('\n');
    diagram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wires::SolderType;

    fn vertex(name: &str, scheduler_type: TaskSchedulerType, capacity: Option<i64>) -> ModelVertex {
        ModelVertex {
            name: name.to_string(),
            scheduler_type,
            capacity,
        }
    }

    fn topology() -> (Vec<ModelVertex>, Vec<ModelEdge>) {
        let ingest = vertex("ingest", TaskSchedulerType::Sequential, Some(2));
        let hasher = vertex("hasher", TaskSchedulerType::Concurrent, Some(10));
        let logger = vertex("logger", TaskSchedulerType::Direct, None);
        let metrics = vertex("metrics", TaskSchedulerType::DirectStateless, None);
        let edges = vec![
            ModelEdge::new("ingest", &hasher, "events", SolderType::Put),
            ModelEdge::new("hasher", &logger, "hashed", SolderType::Put),
            ModelEdge::new("hasher", &metrics, "hashed", SolderType::Offer),
        ];
        (vec![ingest, hasher, logger, metrics], edges)
    }

    #[test]
    fn renders_shapes_and_arrows() {
        let (vertices, edges) = topology();

        let expected = "flowchart TD\n\
            \x20   hasher[[hasher]]\n\
            \x20   ingest[ingest]\n\
            \x20   logger[/logger/]\n\
            \x20   metrics{{metrics}}\n\
            \x20   hasher -->|\"hashed\"| logger\n\
            \x20   hasher -.->|\"hashed\"| metrics\n\
            \x20   ingest -->|\"events\"| hasher\n";

        assert_eq!(render(&vertices, &edges, &[], &[], &[]), expected);
    }

    #[test]
    fn renders_groups_substitutions_and_manual_links() {
        let (vertices, edges) = topology();
        let groups = vec![
            ModelGroup::new("Sinks & Stats", ["logger", "metrics"], false),
            ModelGroup::new("front", ["ingest", "logger"], true),
        ];
        let substitutions = vec![ModelEdgeSubstitution {
            source: "hasher".to_string(),
            label: "hashed".to_string(),
            substitution: "hashes".to_string(),
        }];
        let manual_links = vec![ModelManualLink {
            source: "metrics".to_string(),
            label: "scrape".to_string(),
            target: "ingest".to_string(),
        }];

        let expected = "flowchart TD\n\
            \x20   hasher[[hasher]]\n\
            \x20   subgraph group_Sinks___Stats[\"Sinks & Stats\"]\n\
            \x20       logger[/logger/]\n\
            \x20       metrics{{metrics}}\n\
            \x20   end\n\
            \x20   group_front([\"front\"])\n\
            \x20   sub_0_src((\"hashes\"))\n\
            \x20   hasher --> sub_0_src\n\
            \x20   sub_0_0((\"hashes\"))\n\
            \x20   sub_0_0 --> logger\n\
            \x20   sub_0_1((\"hashes\"))\n\
            \x20   sub_0_1 -.-> metrics\n\
            \x20   group_front -->|\"events\"| hasher\n\
            \x20   metrics -.->|\"scrape\"| group_front\n";

        assert_eq!(
            render(&vertices, &edges, &groups, &substitutions, &manual_links),
            expected
        );
    }

    #[test]
    fn collapsed_groups_hide_internal_edges_and_merge_duplicates() {
        let a = vertex("a", TaskSchedulerType::Sequential, Some(1));
        let b = vertex("b", TaskSchedulerType::Sequential, Some(1));
        let c = vertex("c", TaskSchedulerType::Sequential, Some(1));
        let edges = vec![
            ModelEdge::new("a", &b, "in", SolderType::Put),
            ModelEdge::new("a", &c, "in", SolderType::Put),
            ModelEdge::new("b", &c, "in", SolderType::Put),
        ];
        let groups = vec![ModelGroup::new("pair", ["b", "c"], true)];

        let expected = "flowchart TD\n\
            \x20   a[a]\n\
            \x20   group_pair([\"pair\"])\n\
            \x20   a -->|\"in\"| group_pair\n";

        assert_eq!(render(&[a, b, c], &edges, &groups, &[], &[]), expected);
    }
}
