//! Service dependency graph using `petgraph`.
//!
//! Builds a directed graph from the dependency arguments of a namespace and
//! resolves a construction order in which every service comes after the
//! services it depends on. Neither the compiler nor the runtime require this;
//! it is an on-demand check for cycles and a planning aid.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use wirebox_common::constants::SELF_NAME;
use wirebox_common::error::{Result, WireboxError};

use crate::namespace::Namespace;

/// A dependency graph of services and aliases.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Builds the graph for every service and alias of `namespace`.
    ///
    /// References to names the namespace does not define (dynamic services)
    /// and to the reserved container name are left out.
    #[must_use]
    pub fn from_namespace(namespace: &Namespace) -> Self {
        let mut graph = Self::new();
        for name in namespace.services().keys().chain(namespace.aliases().keys()) {
            let _ = graph.add_service(name);
        }

        for (name, definition) in namespace.services() {
            for dependency in definition.dependencies() {
                graph.link(name, dependency);
            }
        }
        for (alias, target) in namespace.aliases() {
            graph.link(alias, target);
        }
        graph
    }

    fn link(&mut self, dependent: &str, dependency: &str) {
        if dependency == SELF_NAME {
            return;
        }
        if let (Some(&from), Some(&to)) = (self.nodes.get(dependent), self.nodes.get(dependency)) {
            self.add_dependency(from, to);
        }
    }

    /// Adds a service node, or returns the existing one.
    pub fn add_service(&mut self, name: impl Into<String>) -> NodeIndex {
        let name = name.into();
        if let Some(&idx) = self.nodes.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        let _ = self.nodes.insert(name, idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Names of the services `name` depends on directly.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.nodes.get(name).map_or_else(Vec::new, |&idx| {
            let mut deps: Vec<&str> = self
                .graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
                .collect();
            deps.sort_unstable();
            deps
        })
    }

    /// Returns a construction order: dependencies before dependents.
    ///
    /// # Errors
    ///
    /// Returns an error naming a service on the cycle if the graph is cyclic.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let name = self
                    .graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default();
                Err(WireboxError::builder(format!(
                    "cyclic dependency detected involving service \"{name}\""
                )))
            }
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
