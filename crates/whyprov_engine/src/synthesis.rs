//! Provenance-rule synthesis.
//!
//! Every original rule gets a companion rule that keeps the body verbatim and
//! widens the head to expose every body variable:
//!
//! ```text
//! a(X,Y) :- b(X,Z),c(Z,Y);
//! a_prov0(X,Y,Z) :- b(X,Z),c(Z,Y);
//! ```
//!
//! The original head attributes always come first, in their original order,
//! so a provenance tuple prefix-aligns with the tuple it justifies.

use tracing::debug;

use whyprov_foundation::{Error, Result, ScalarType};
use whyprov_language::{Attribute, Rule};
use whyprov_storage::SchemaRegistry;

/// Infix between the original goal name and the counter.
pub const PROVENANCE_INFIX: &str = "_prov";

/// Returns `<goal>_prov<index>`.
#[must_use]
pub fn provenance_name(goal: &str, index: u64) -> String {
    format!("{goal}{PROVENANCE_INFIX}{index}")
}

/// Strips a trailing `_prov<digits>` from `name`.
///
/// Returns `None` unless `name` follows the provenance naming scheme. This
/// is a naming helper only: user relations may have the same shape, so
/// whether a rule was synthesized is read from [`Rule::is_provenance`].
#[must_use]
pub fn provenance_base(name: &str) -> Option<&str> {
    let at = name.rfind(PROVENANCE_INFIX)?;
    let digits = &name[at + PROVENANCE_INFIX.len()..];
    if at == 0 || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(&name[..at])
}

/// Builds provenance rules and infers their schemas.
///
/// The counter is session state: it starts at zero, increases by one per
/// synthesized rule, and is never reset or reused.
#[derive(Clone, Debug, Default)]
pub struct ProvenanceSynthesizer {
    counter: u64,
}

impl ProvenanceSynthesizer {
    /// Creates a synthesizer whose first rule is numbered 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index the next synthesized rule will get.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Synthesizes the provenance rule for `rule` and registers its schema.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvableAttributeType` if a head attribute never appears
    /// in a subgoal, `UnknownRelation` if the subgoal that first mentions an
    /// attribute has no declared schema, and `ArityMismatch` if that schema
    /// is shorter than the subgoal. On error the counter is left unchanged.
    pub fn synthesize(
        &mut self,
        rule: &Rule,
        schema: &mut SchemaRegistry,
    ) -> Result<(Rule, Vec<ScalarType>)> {
        let name = provenance_name(rule.goal_name(), self.counter);

        let mut head: Vec<Attribute> = rule.goal_attributes().to_vec();
        for variable in rule.body_variables() {
            let attribute = Attribute::Variable(variable.to_string());
            if !head.contains(&attribute) {
                head.push(attribute);
            }
        }

        let provenance = Rule::new(name.clone(), head, rule.subgoals().to_vec()).into_provenance();
        let types = infer_schema(&provenance, schema)?;

        debug!(rule = %rule, provenance = %provenance, ?types, "synthesized provenance rule");
        schema.declare(name, types.clone());
        self.counter += 1;

        Ok((provenance, types))
    }

    /// Synthesizes provenance rules for `rules` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first rule that fails to synthesize.
    pub fn synthesize_all(&mut self, rules: &[Rule], schema: &mut SchemaRegistry) -> Result<Vec<Rule>> {
        rules
            .iter()
            .map(|rule| self.synthesize(rule, schema).map(|(provenance, _)| provenance))
            .collect()
    }
}

/// Types each head attribute from the first subgoal position that holds it.
fn infer_schema(rule: &Rule, schema: &SchemaRegistry) -> Result<Vec<ScalarType>> {
    rule.goal_attributes()
        .iter()
        .map(|attribute| {
            let Some(variable) = attribute.variable() else {
                return Err(Error::unresolvable_attribute(rule.render(), attribute.to_string()));
            };
            for subgoal in rule.subgoals() {
                let Some(position) = subgoal
                    .attributes
                    .iter()
                    .position(|a| a.variable() == Some(variable))
                else {
                    continue;
                };
                let types = schema.lookup(&subgoal.name)?;
                return types.get(position).cloned().ok_or_else(|| {
                    Error::arity_mismatch(&subgoal.name, types.len(), subgoal.attributes.len())
                });
            }
            Err(Error::unresolvable_attribute(rule.render(), variable))
        })
        .collect()
}
