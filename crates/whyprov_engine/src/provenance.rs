//! Why-provenance trees.
//!
//! Given a relation and one of its result tuples, [`TreeBuilder`] chains
//! backwards through the frozen results to the rule firings and base facts
//! that produced it:
//!
//! ```text
//! G_a(0,1)
//! └── R_a_prov0(0,1,str10)
//!     ├── G_b(0,str10) ── F_b(0,str10)
//!     └── G_c(str10,1) ── F_c(str10,1)
//! ```
//!
//! The builder only reads the results table and the rule list, so one
//! table can serve any number of concurrent queries.

use std::collections::HashMap;

use tracing::{debug, trace};

use whyprov_foundation::{Error, ErrorKind, Result, Tuple, WILDCARD};
use whyprov_language::{Attribute, NEGATION_MARKER, Rule};
use whyprov_storage::ResultsTable;

use crate::graph::{Node, NodeKind, ProvenanceGraph};
use crate::synthesis::provenance_base;

/// Builds provenance graphs against one evaluation.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilder<'a> {
    results: &'a ResultsTable,
    rules: &'a [Rule],
}

/// A provenance rule that fired, paired with its original.
struct Firing<'a> {
    provenance: &'a Rule,
    original: &'a Rule,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder over `results` and every declared rule, original
    /// and provenance.
    #[must_use]
    pub fn new(results: &'a ResultsTable, rules: &'a [Rule]) -> Self {
        Self { results, rules }
    }

    /// Returns true if `relation` holds a tuple equal to `tuple`, compared
    /// componentwise as raw strings.
    #[must_use]
    pub fn verify(&self, relation: &str, tuple: &Tuple) -> bool {
        let found = self.results.contains(relation, tuple);
        debug!(relation, tuple = %tuple, found, "verify tuple");
        found
    }

    /// Builds the provenance graph of `tuple` in `relation`.
    ///
    /// The tuple must [`verify`](Self::verify) exactly; a wildcard tuple is
    /// never a result tuple. Use [`build_tree`](Self::build_tree) to expand
    /// a wildcard pattern directly.
    ///
    /// # Errors
    ///
    /// Returns `TupleNotFound` before building anything if the tuple is not
    /// in the results, and any error raised while building.
    pub fn explain(&self, relation: &str, tuple: &Tuple) -> Result<ProvenanceGraph> {
        if !self.verify(relation, tuple) {
            return Err(Error::tuple_not_found(relation, tuple));
        }
        self.build_tree(relation, tuple, &[])
    }

    /// Builds the derivation graph of `tuple` below `ancestors`.
    ///
    /// `relation` may carry the negation marker (`notin d`).
    ///
    /// # Errors
    ///
    /// Returns `NoProvenanceCounterpart`, `NoAlignedTuple`, `ArityMismatch`,
    /// or `UnboundVariable` when the rule set and the results disagree.
    pub fn build_tree(&self, relation: &str, tuple: &Tuple, ancestors: &[Node]) -> Result<ProvenanceGraph> {
        let relation = relation.trim();
        let (name, negated) = match relation.strip_prefix(NEGATION_MARKER.trim_end()) {
            Some(rest) if rest.starts_with(char::is_whitespace) => (rest.trim(), true),
            _ => (relation, false),
        };

        let mut graph = ProvenanceGraph::new();
        let mut path = Vec::new();
        self.build(name, negated, tuple, ancestors, &mut path, &mut graph)?;
        Ok(graph)
    }

    fn build(
        &self,
        relation: &str,
        negated: bool,
        tuple: &Tuple,
        ancestors: &[Node],
        path: &mut Vec<Node>,
        graph: &mut ProvenanceGraph,
    ) -> Result<()> {
        trace!(relation, negated, tuple = %tuple, ancestors = ancestors.len(), "build tree");

        if negated {
            let display = format!("{NEGATION_MARKER}{relation}");
            let goal = Node::new(&display, tuple, NodeKind::Goal);
            graph.add_node(goal.clone());
            graph.link(ancestors, &goal);
            return Ok(());
        }

        if tuple.has_wildcard() {
            return self.build_wildcard(relation, tuple, ancestors, path, graph);
        }

        if self.is_edb_only(relation) {
            let goal = Node::new(relation, tuple, NodeKind::Goal);
            let fact = Node::new(relation, tuple, NodeKind::Fact);
            graph.add_node(goal.clone());
            graph.link(ancestors, &goal);
            graph.link(std::slice::from_ref(&goal), &fact);
            return Ok(());
        }

        self.build_idb(relation, tuple, ancestors, path, graph)
    }

    fn build_wildcard(
        &self,
        relation: &str,
        tuple: &Tuple,
        ancestors: &[Node],
        path: &mut Vec<Node>,
        graph: &mut ProvenanceGraph,
    ) -> Result<()> {
        let goal = Node::new(relation, tuple, NodeKind::Goal);
        graph.add_node(goal.clone());
        graph.link(ancestors, &goal);

        let resolved: Vec<&Tuple> = self
            .results
            .tuples(relation)
            .filter(|t| t.matches_pattern(tuple))
            .collect();
        debug!(relation, pattern = %tuple, matches = resolved.len(), "resolved wildcards");

        let parent = [goal];
        for concrete in resolved {
            self.build(relation, false, concrete, &parent, path, graph)?;
        }
        Ok(())
    }

    fn build_idb(
        &self,
        relation: &str,
        tuple: &Tuple,
        ancestors: &[Node],
        path: &mut Vec<Node>,
        graph: &mut ProvenanceGraph,
    ) -> Result<()> {
        let mut firings = Vec::new();
        for provenance in self.provenance_rules(relation) {
            let original = self.counterpart(relation, provenance)?;
            if self.aligned(provenance, tuple).next().is_some() {
                firings.push(Firing { provenance, original });
            }
        }
        debug!(relation, tuple = %tuple, candidates = firings.len(), "candidate firing rules");

        if firings.is_empty() {
            return Ok(());
        }

        let goal = Node::new(relation, tuple, NodeKind::Goal);
        graph.add_node(goal.clone());
        graph.link(ancestors, &goal);

        if path.contains(&goal) {
            trace!(goal = %goal, "goal already on the derivation path");
            return Ok(());
        }
        path.push(goal.clone());

        let result = self.expand_firings(&goal, tuple, &firings, path, graph);
        path.pop();
        result.map_err(|e| in_frame(e, &goal))
    }

    fn expand_firings(
        &self,
        goal: &Node,
        tuple: &Tuple,
        firings: &[Firing<'_>],
        path: &mut Vec<Node>,
        graph: &mut ProvenanceGraph,
    ) -> Result<()> {
        for firing in firings {
            let name = firing.provenance.goal_name();
            let aligned: Vec<&Tuple> = self.aligned(firing.provenance, tuple).collect();
            if aligned.is_empty() {
                return Err(Error::new(ErrorKind::NoAlignedTuple {
                    rule: name.to_string(),
                    tuple: tuple.to_string(),
                }));
            }

            for provenance_tuple in aligned {
                let rule_node = Node::new(name, provenance_tuple, NodeKind::Rule);
                graph.link(std::slice::from_ref(goal), &rule_node);

                let bindings = bind(firing.provenance, provenance_tuple)?;
                let parent = [rule_node];
                for subgoal in firing.original.subgoals() {
                    let args = subgoal
                        .attributes
                        .iter()
                        .map(|attribute| match attribute {
                            Attribute::Wildcard => Ok(WILDCARD.to_string()),
                            Attribute::Variable(variable) => bindings
                                .get(variable.as_str())
                                .map(|value| (*value).to_string())
                                .ok_or_else(|| {
                                    Error::new(ErrorKind::UnboundVariable {
                                        rule: firing.original.render(),
                                        variable: variable.clone(),
                                    })
                                }),
                        })
                        .collect::<Result<Tuple>>()?;
                    self.build(&subgoal.name, subgoal.negated, &args, &parent, path, graph)?;
                }
            }
        }
        Ok(())
    }

    /// True when no rule has `relation` as its head.
    fn is_edb_only(&self, relation: &str) -> bool {
        !self.rules.iter().any(|r| r.goal_name() == relation)
    }

    /// Synthesized rules of `relation`. User rules whose names happen to
    /// end in `_prov<N>` are ordinary rules.
    fn provenance_rules(&self, relation: &str) -> Vec<&'a Rule> {
        self.rules
            .iter()
            .filter(|r| r.is_provenance && provenance_base(r.goal_name()) == Some(relation))
            .collect()
    }

    fn counterpart(&self, relation: &str, provenance: &Rule) -> Result<&'a Rule> {
        self.rules
            .iter()
            .find(|r| !r.is_provenance && r.goal_name() == relation && r.body_eq(provenance))
            .ok_or_else(|| Error::new(ErrorKind::NoProvenanceCounterpart(provenance.render())))
    }

    fn aligned<'t>(&'t self, provenance: &'t Rule, tuple: &'t Tuple) -> impl Iterator<Item = &'t Tuple> + 't {
        self.results
            .tuples(provenance.goal_name())
            .filter(move |candidate| candidate.aligns_with(tuple))
    }
}

/// Binds the provenance head attributes positionally to `tuple`.
fn bind<'r>(rule: &'r Rule, tuple: &'r Tuple) -> Result<HashMap<&'r str, &'r str>> {
    let attributes = rule.goal_attributes();
    if attributes.len() != tuple.len() {
        return Err(Error::arity_mismatch(rule.goal_name(), attributes.len(), tuple.len()));
    }
    Ok(attributes
        .iter()
        .zip(tuple.fields())
        .filter_map(|(attribute, value)| attribute.variable().map(|v| (v, value.as_str())))
        .collect())
}

fn in_frame(err: Error, goal: &Node) -> Error {
    let context = err.context.clone().unwrap_or_default().with_frame(goal.to_string());
    err.with_context(context)
}
