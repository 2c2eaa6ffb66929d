//! Provenance graph model.
//!
//! Nodes are value objects identified by their canonical label: two nodes
//! with the same kind and label are the same node. The graph keeps nodes and
//! edges in insertion order and collapses duplicates, so it is a simple
//! directed graph rather than a multigraph.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::trace;

use whyprov_foundation::{Error, ErrorKind, Result, Tuple};
use whyprov_language::NEGATION_MARKER;

// =============================================================================
// Node Kind
// =============================================================================

/// What a node stands for in a derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A relation/tuple pair that needs justification.
    Goal,
    /// A base fact directly satisfying a goal.
    Fact,
    /// One grounded firing of a provenance rule.
    Rule,
}

impl NodeKind {
    /// Returns the identity prefix: `G_`, `F_`, or `R_`.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Goal => "G_",
            Self::Fact => "F_",
            Self::Rule => "R_",
        }
    }

    /// Returns the render shape.
    #[must_use]
    pub const fn shape(self) -> &'static str {
        match self {
            Self::Goal => "oval",
            Self::Fact => "cylinder",
            Self::Rule => "box",
        }
    }

    /// Returns the kind tag, e.g. `goal`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Fact => "fact",
            Self::Rule => "rule",
        }
    }

    /// Parses an identity prefix.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedNodeKind` for anything but `G_`, `F_`, or `R_`.
    pub fn from_prefix(prefix: &str) -> Result<Self> {
        match prefix {
            "G_" => Ok(Self::Goal),
            "F_" => Ok(Self::Fact),
            "R_" => Ok(Self::Rule),
            other => Err(Error::new(ErrorKind::UnrecognizedNodeKind(other.to_string()))),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    /// Accepts a kind tag (`goal`, `fact`, `rule`, any case) or a prefix.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "goal" => Ok(Self::Goal),
            "fact" => Ok(Self::Fact),
            "rule" => Ok(Self::Rule),
            _ => Self::from_prefix(s),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Canonical label for `relation` and `tuple`.
///
/// Whitespace is stripped everywhere except in the negation marker, which
/// is normalized to `notin ` directly before the relation name.
#[must_use]
pub fn canonical_label(relation: &str, tuple: &Tuple) -> String {
    let relation = relation.trim();
    let (negated, name) = match relation.strip_prefix(NEGATION_MARKER.trim_end()) {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, relation),
    };
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    if negated {
        format!("{NEGATION_MARKER}{name}{tuple}")
    } else {
        format!("{name}{tuple}")
    }
}

/// A graph node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    kind: NodeKind,
    label: String,
}

impl Node {
    /// Creates the node for `relation` and `tuple`.
    ///
    /// `relation` may carry the negation marker, e.g. `notin d`.
    #[must_use]
    pub fn new(relation: &str, tuple: &Tuple, kind: NodeKind) -> Self {
        let label = canonical_label(relation, tuple);
        trace!(kind = %kind, label = %label, "create node");
        Self { kind, label }
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the canonical label, e.g. `a(0,1)`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the prefixed name, e.g. `G_a(0,1)`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.label)
    }

    /// Returns the external identifier: the name wrapped in double quotes.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("\"{}\"", self.name())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.label)
    }
}

impl FromStr for Node {
    type Err = Error;

    /// Parses a prefixed name, quoted or not.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_matches('"');
        let (prefix, label) = match (name.get(..2), name.get(2..)) {
            (Some(prefix), Some(label)) => (prefix, label),
            _ => (name, ""),
        };
        Ok(Self {
            kind: NodeKind::from_prefix(prefix)?,
            label: label.to_string(),
        })
    }
}

// =============================================================================
// Edge
// =============================================================================

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Source node.
    pub from: Node,
    /// Destination node.
    pub to: Node,
}

impl Edge {
    /// Creates an edge from `from` to `to`.
    #[must_use]
    pub fn new(from: Node, to: Node) -> Self {
        trace!(from = %from, to = %to, "create edge");
        Self { from, to }
    }
}

// =============================================================================
// Provenance Graph
// =============================================================================

/// Nodes and edges of one derivation, in insertion order, without
/// duplicates.
#[derive(Clone, Debug, Default)]
pub struct ProvenanceGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashSet<Node>,
    edge_index: HashSet<Edge>,
}

impl PartialEq for ProvenanceGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Eq for ProvenanceGraph {}

impl ProvenanceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns false if it was already present.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node_index.contains(&node) {
            return false;
        }
        self.node_index.insert(node.clone());
        self.nodes.push(node);
        true
    }

    /// Adds an edge, and its endpoints if missing. Returns false if the
    /// `(from, to)` pair was already present.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edge_index.contains(&edge) {
            return false;
        }
        self.add_node(edge.from.clone());
        self.add_node(edge.to.clone());
        self.edge_index.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    /// Adds an edge from every node in `ancestors` to `node`.
    pub fn link(&mut self, ancestors: &[Node], node: &Node) {
        for ancestor in ancestors {
            self.add_edge(Edge::new(ancestor.clone(), node.clone()));
        }
    }

    /// Unions `other` into this graph, keeping first-seen order.
    pub fn merge(&mut self, other: ProvenanceGraph) {
        for node in other.nodes {
            self.add_node(node);
        }
        for edge in other.edges {
            self.add_edge(edge);
        }
    }

    /// Returns the nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the node with the given prefixed name, e.g. `G_a(0,1)`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Returns true if a node with the given prefixed name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Returns true if an edge joins the two prefixed names.
    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.from.name() == from && e.to.name() == to)
    }

    /// Returns the direct successors of `node` in edge order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        self.edges.iter().filter(move |e| &e.from == node).map(|e| &e.to)
    }

    /// Returns nodes with no incoming edge, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        let targets: HashSet<&Node> = self.edges.iter().map(|e| &e.to).collect();
        self.nodes.iter().filter(move |n| !targets.contains(n))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
