//! Rule evaluation.
//!
//! The evaluator is an external collaborator: it receives the schema, the
//! base facts, and every rule (original and provenance), and answers with
//! program text, the relation order, and the flat result stream. Anything
//! that honors that contract can implement [`Evaluator`].
//!
//! [`StratifiedEvaluator`] is the in-process implementation. It stratifies
//! the program by negation and runs each stratum to a fixpoint with naive
//! iteration. Tuples are reported in derivation order, base facts first.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use whyprov_foundation::{Error, ErrorKind, Result, Value, WILDCARD};
use whyprov_language::{Attribute, Rule, Subgoal, render_program};
use whyprov_storage::{FactStore, RESULT_SEPARATOR, SchemaRegistry};

/// Default cap on fixpoint iterations per stratum.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

// =============================================================================
// Contract
// =============================================================================

/// Everything the evaluator needs for one batch.
#[derive(Clone, Copy, Debug)]
pub struct ProgramInput<'a> {
    /// Schemas of every relation, original relations first.
    pub schema: &'a SchemaRegistry,
    /// Base facts.
    pub facts: &'a FactStore,
    /// Original rules followed by their provenance rules.
    pub rules: &'a [Rule],
}

/// The three artifacts returned by an evaluator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationOutput {
    /// Program text, one statement per line.
    pub program: Vec<String>,
    /// Relation names in definition order.
    pub relations: Vec<String>,
    /// Flat result stream.
    pub results: Vec<String>,
}

/// Evaluates a datalog program in one batch.
pub trait Evaluator {
    /// Evaluates `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the program is rejected or evaluation fails.
    fn evaluate(&self, input: &ProgramInput<'_>) -> Result<EvaluationOutput>;
}

// =============================================================================
// Stratified Evaluator
// =============================================================================

/// In-process bottom-up evaluator with stratified negation.
#[derive(Clone, Debug)]
pub struct StratifiedEvaluator {
    max_iterations: usize,
}

impl Default for StratifiedEvaluator {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl StratifiedEvaluator {
    /// Creates an evaluator with the default iteration cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-stratum iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Returns the per-stratum iteration cap.
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    fn validate(input: &ProgramInput<'_>) -> Result<()> {
        for relation in input.facts.relations() {
            let types = input.schema.lookup(relation)?;
            if let Some(values) = input.facts.tuples(relation).find(|v| v.len() != types.len()) {
                return Err(Error::arity_mismatch(relation, types.len(), values.len()));
            }
        }

        for rule in input.rules {
            check_arity(input.schema, rule.goal_name(), rule.goal_attributes().len())?;
            for subgoal in rule.subgoals() {
                check_arity(input.schema, &subgoal.name, subgoal.attributes.len())?;
            }
            check_safety(rule)?;
        }
        Ok(())
    }
}

fn check_arity(schema: &SchemaRegistry, relation: &str, actual: usize) -> Result<()> {
    let expected = schema.lookup(relation)?.len();
    if expected == actual {
        Ok(())
    } else {
        Err(Error::arity_mismatch(relation, expected, actual))
    }
}

/// Head variables and negated-subgoal variables must be bound positively.
fn check_safety(rule: &Rule) -> Result<()> {
    let positive: HashSet<&str> = rule
        .subgoals()
        .iter()
        .filter(|s| !s.negated)
        .flat_map(|s| s.attributes.iter().filter_map(Attribute::variable))
        .collect();

    let negated = rule
        .subgoals()
        .iter()
        .filter(|s| s.negated)
        .flat_map(|s| s.attributes.iter().filter_map(Attribute::variable));

    for attribute in rule.goal_attributes() {
        let variable = attribute.variable().unwrap_or(WILDCARD);
        if !positive.contains(variable) {
            return Err(unsafe_rule(rule, variable));
        }
    }
    for variable in negated {
        if !positive.contains(variable) {
            return Err(unsafe_rule(rule, variable));
        }
    }
    Ok(())
}

fn unsafe_rule(rule: &Rule, variable: &str) -> Error {
    Error::new(ErrorKind::UnsafeRule {
        rule: rule.render(),
        variable: variable.to_string(),
    })
}

/// Assigns each rule-defined relation a stratum such that positive
/// dependencies stay in the same or a lower stratum and negative ones are
/// strictly lower. Returns rule indices grouped by stratum, ascending.
fn stratify(rules: &[Rule]) -> Result<Vec<Vec<usize>>> {
    let mut stratum: HashMap<&str, usize> = HashMap::new();
    for rule in rules {
        stratum.insert(rule.goal_name(), 0);
        for subgoal in rule.subgoals() {
            stratum.entry(subgoal.name.as_str()).or_insert(0);
        }
    }
    let limit = stratum.len();

    loop {
        let mut changed = false;
        for rule in rules {
            let head = rule.goal_name();
            for subgoal in rule.subgoals() {
                let below = stratum.get(subgoal.name.as_str()).copied().unwrap_or(0);
                let required = if subgoal.negated { below + 1 } else { below };
                let current = stratum.get(head).copied().unwrap_or(0);
                if current < required {
                    if required > limit {
                        return Err(Error::new(ErrorKind::Unstratifiable(head.to_string())));
                    }
                    stratum.insert(head, required);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let depth = rules
        .iter()
        .map(|r| stratum.get(r.goal_name()).copied().unwrap_or(0))
        .max()
        .map_or(0, |d| d + 1);
    let mut strata = vec![Vec::new(); depth];
    for (index, rule) in rules.iter().enumerate() {
        let level = stratum.get(rule.goal_name()).copied().unwrap_or(0);
        strata[level].push(index);
    }
    Ok(strata)
}

// =============================================================================
// Relation Storage
// =============================================================================

#[derive(Default)]
struct Relations {
    tuples: HashMap<String, Vec<Vec<Value>>>,
    seen: HashSet<(String, Vec<Value>)>,
}

impl Relations {
    fn insert(&mut self, relation: &str, values: Vec<Value>) -> bool {
        if !self.seen.insert((relation.to_string(), values.clone())) {
            return false;
        }
        self.tuples.entry(relation.to_string()).or_default().push(values);
        true
    }

    fn get(&self, relation: &str) -> &[Vec<Value>] {
        self.tuples.get(relation).map(Vec::as_slice).unwrap_or_default()
    }

    fn contains(&self, relation: &str, values: &[Value]) -> bool {
        self.seen.contains(&(relation.to_string(), values.to_vec()))
    }
}

type Binding<'r> = HashMap<&'r str, Value>;

/// Extends `binding` with `values` matched against `attributes`, or returns
/// `None` on a conflict.
fn unify<'r>(attributes: &'r [Attribute], values: &[Value], binding: &Binding<'r>) -> Option<Binding<'r>> {
    let mut extended = binding.clone();
    for (attribute, value) in attributes.iter().zip(values) {
        let Some(variable) = attribute.variable() else {
            continue;
        };
        match extended.get(variable) {
            Some(bound) if bound != value => return None,
            Some(_) => {}
            None => {
                extended.insert(variable, value.clone());
            }
        }
    }
    Some(extended)
}

/// Tests whether `subgoal` has a match under `binding`.
fn has_match(subgoal: &Subgoal, binding: &Binding<'_>, relations: &Relations) -> bool {
    let bound: Option<Vec<Value>> = subgoal
        .attributes
        .iter()
        .map(|a| a.variable().and_then(|v| binding.get(v).cloned()))
        .collect();
    if let Some(values) = bound {
        return relations.contains(&subgoal.name, &values);
    }
    relations
        .get(&subgoal.name)
        .iter()
        .any(|values| unify(&subgoal.attributes, values, binding).is_some())
}

/// Derives every head tuple of `rule` from the current relations.
fn fire(rule: &Rule, relations: &Relations) -> Vec<Vec<Value>> {
    let mut bindings: Vec<Binding<'_>> = vec![HashMap::new()];
    for subgoal in rule.subgoals().iter().filter(|s| !s.negated) {
        let rows = relations.get(&subgoal.name);
        bindings = bindings
            .iter()
            .flat_map(|binding| {
                rows.iter()
                    .filter_map(move |values| unify(&subgoal.attributes, values, binding))
            })
            .collect();
        if bindings.is_empty() {
            return Vec::new();
        }
    }

    bindings
        .into_iter()
        .filter(|binding| {
            rule.subgoals()
                .iter()
                .filter(|s| s.negated)
                .all(|s| !has_match(s, binding, relations))
        })
        .filter_map(|binding| {
            rule.goal_attributes()
                .iter()
                .map(|a| a.variable().and_then(|v| binding.get(v).cloned()))
                .collect()
        })
        .collect()
}

impl Evaluator for StratifiedEvaluator {
    fn evaluate(&self, input: &ProgramInput<'_>) -> Result<EvaluationOutput> {
        Self::validate(input)?;
        let strata = stratify(input.rules)?;
        debug!(
            rules = input.rules.len(),
            facts = input.facts.len(),
            strata = strata.len(),
            "evaluating program"
        );

        let mut relations = Relations::default();
        for (relation, values) in input.facts.iter() {
            relations.insert(relation, values.clone());
        }

        for (level, members) in strata.iter().enumerate() {
            let mut iteration = 0;
            loop {
                iteration += 1;
                if iteration > self.max_iterations {
                    return Err(Error::internal(format!(
                        "stratum {level} did not reach a fixpoint within {} iterations",
                        self.max_iterations
                    )));
                }

                let mut added = 0usize;
                for &index in members {
                    let rule = &input.rules[index];
                    for values in fire(rule, &relations) {
                        if relations.insert(rule.goal_name(), values) {
                            added += 1;
                        }
                    }
                }
                trace!(stratum = level, iteration, added, "fixpoint step");
                if added == 0 {
                    break;
                }
            }
        }

        let relation_order: Vec<String> = input.schema.relations().map(str::to_string).collect();
        let mut results = Vec::new();
        for relation in &relation_order {
            results.push(RESULT_SEPARATOR.to_string());
            results.push(relation.clone());
            results.extend(relations.get(relation).iter().map(|values| {
                values
                    .iter()
                    .map(Value::raw)
                    .collect::<Vec<_>>()
                    .join(",")
            }));
        }

        debug!(relations = relation_order.len(), lines = results.len(), "evaluation finished");
        Ok(EvaluationOutput {
            program: render_program(input.schema, input.facts, input.rules),
            relations: relation_order,
            results,
        })
    }
}
