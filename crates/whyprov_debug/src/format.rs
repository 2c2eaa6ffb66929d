//! Provenance graph formatters.
//!
//! [`DotFormatter`] emits Graphviz input for the external renderer;
//! [`TreeFormatter`] draws the derivation as an indented tree for terminals.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use whyprov_engine::{Node, NodeKind, ProvenanceGraph};
use whyprov_foundation::{Error, ErrorKind, Result};

use crate::config::ProvenanceConfig;

// =============================================================================
// Graph Formatter Trait
// =============================================================================

/// Trait for formatting provenance graphs.
pub trait GraphFormatter {
    /// Formats a graph to a string.
    fn format(&self, graph: &ProvenanceGraph) -> String;
}

// =============================================================================
// DOT Formatter
// =============================================================================

/// Formats graphs as a Graphviz `strict digraph`.
#[derive(Clone, Debug, Default)]
pub struct DotFormatter {
    config: ProvenanceConfig,
}

impl DotFormatter {
    /// Creates a formatter with the given configuration.
    #[must_use]
    pub fn new(config: ProvenanceConfig) -> Self {
        Self { config }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl GraphFormatter for DotFormatter {
    fn format(&self, graph: &ProvenanceGraph) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "strict digraph \"{}\" {{", escape(&self.config.graph_name));

        if self.config.legend {
            for kind in [NodeKind::Goal, NodeKind::Rule, NodeKind::Fact] {
                let _ = writeln!(out, "  // {}...: {} ({})", kind.prefix(), kind, kind.shape());
            }
            let _ = writeln!(
                out,
                "  // {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
        }

        for node in graph.nodes() {
            let _ = writeln!(
                out,
                "  {} [shape={}, margin={}];",
                node.identity(),
                node.kind().shape(),
                self.config.margin
            );
        }
        for edge in graph.edges() {
            let _ = writeln!(out, "  {} -> {};", edge.from.identity(), edge.to.identity());
        }

        out.push('}');
        out.push('\n');
        out
    }
}

// =============================================================================
// Tree Formatter
// =============================================================================

/// Formats graphs as an indented tree, one root at a time.
///
/// A node reachable along several paths is expanded once; later
/// occurrences are marked with `*`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeFormatter;

impl TreeFormatter {
    /// Creates a tree formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn write_node<'g>(
        graph: &'g ProvenanceGraph,
        node: &'g Node,
        prefix: &str,
        last: bool,
        seen: &mut HashSet<&'g Node>,
        out: &mut String,
    ) {
        let branch = if last { "└── " } else { "├── " };
        let repeat = !seen.insert(node);
        let _ = writeln!(out, "{prefix}{branch}{node}{}", if repeat { " *" } else { "" });
        if repeat {
            return;
        }

        let children: Vec<&Node> = graph.children(node).collect();
        let next = format!("{prefix}{}", if last { "    " } else { "│   " });
        for (i, child) in children.iter().enumerate() {
            Self::write_node(graph, child, &next, i + 1 == children.len(), seen, out);
        }
    }
}

impl GraphFormatter for TreeFormatter {
    fn format(&self, graph: &ProvenanceGraph) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();
        // The explained goal comes first even when a cycle leads back to it.
        let first = graph.nodes().first();
        let roots = first
            .into_iter()
            .chain(graph.roots().filter(|n| Some(*n) != first));
        for root in roots {
            if !seen.insert(root) {
                continue;
            }
            let _ = writeln!(out, "{root}");
            let children: Vec<&Node> = graph.children(root).collect();
            for (i, child) in children.iter().enumerate() {
                Self::write_node(graph, child, "", i + 1 == children.len(), &mut seen, &mut out);
            }
        }
        out
    }
}

// =============================================================================
// Rendering Helpers
// =============================================================================

/// Rendering helpers for [`ProvenanceGraph`].
pub trait RenderGraph {
    /// Renders the graph as DOT.
    fn to_dot(&self, config: &ProvenanceConfig) -> String;

    /// Renders the graph as an indented tree.
    fn to_tree(&self) -> String;

    /// Writes the DOT rendering to `path`.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be written.
    fn write_dot(&self, path: &Path, config: &ProvenanceConfig) -> Result<()>;
}

impl RenderGraph for ProvenanceGraph {
    fn to_dot(&self, config: &ProvenanceConfig) -> String {
        DotFormatter::new(config.clone()).format(self)
    }

    fn to_tree(&self) -> String {
        TreeFormatter::new().format(self)
    }

    fn write_dot(&self, path: &Path, config: &ProvenanceConfig) -> Result<()> {
        info!(path = %path.display(), nodes = self.node_count(), "saving provenance graph");
        std::fs::write(path, self.to_dot(config)).map_err(|e| {
            Error::new(ErrorKind::IoError(format!("{}: {e}", path.display())))
        })
    }
}
