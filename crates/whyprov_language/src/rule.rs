//! Structured rules and their canonical text form.
//!
//! Grammar:
//!
//! ```text
//! Head(A1,...,An) :- [notin ]Sub1(a1,...),[notin ]Sub2(...),... ;
//! ```
//!
//! Whitespace is insignificant except between `notin` and the subgoal name.
//! The canonical text strips every other space, so a rule renders as
//! `a(X,Y) :- b(X,Y),notin d(X,Y);`. Attribute and subgoal order are kept
//! verbatim through every transformation; two bodies are equal only when
//! their canonical text is identical.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use whyprov_foundation::{Error, Result, WILDCARD};

/// The canonical negation marker, including its trailing space.
pub const NEGATION_MARKER: &str = "notin ";

const SEPARATOR: &str = ":-";

// =============================================================================
// Attribute
// =============================================================================

/// One attribute position of a goal or subgoal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    /// A named variable.
    Variable(String),
    /// The don't-care marker `_`.
    Wildcard,
}

impl Attribute {
    fn parse(token: &str) -> Self {
        if token == WILDCARD {
            Self::Wildcard
        } else {
            Self::Variable(token.to_string())
        }
    }

    /// Returns the variable name, or `None` for the wildcard.
    #[must_use]
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            Self::Wildcard => None,
        }
    }

    /// Returns true for the wildcard.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_str(name),
            Self::Wildcard => f.write_str(WILDCARD),
        }
    }
}

impl From<&str> for Attribute {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

fn join_attributes(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Subgoal
// =============================================================================

/// A body atom, possibly negated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subgoal {
    /// Relation name.
    pub name: String,
    /// Attributes in order.
    pub attributes: Vec<Attribute>,
    /// True when written as `notin name(...)`.
    pub negated: bool,
}

impl Subgoal {
    /// Creates a positive subgoal.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            negated: false,
        }
    }

    /// Creates a negated subgoal.
    #[must_use]
    pub fn negated(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            negated: true,
            ..Self::new(name, attributes)
        }
    }

    /// Returns the relation name with the negation marker, if any.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.negated {
            format!("{NEGATION_MARKER}{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Subgoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str(NEGATION_MARKER)?;
        }
        write!(f, "{}({})", self.name, join_attributes(&self.attributes))
    }
}

// =============================================================================
// Rule
// =============================================================================

/// A datalog rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    /// Head relation name.
    pub goal_name: String,
    /// Head attributes in order.
    pub goal_attributes: Vec<Attribute>,
    /// Body atoms in order.
    pub subgoals: Vec<Subgoal>,
    /// True for synthesized provenance rules.
    pub is_provenance: bool,
}

impl Rule {
    /// Creates a rule from its parts.
    #[must_use]
    pub fn new(
        goal_name: impl Into<String>,
        goal_attributes: Vec<Attribute>,
        subgoals: Vec<Subgoal>,
    ) -> Self {
        Self {
            goal_name: goal_name.into(),
            goal_attributes,
            subgoals,
            is_provenance: false,
        }
    }

    /// Marks this rule as a provenance rule.
    #[must_use]
    pub fn into_provenance(mut self) -> Self {
        self.is_provenance = true;
        self
    }

    /// Parses rule text.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRule` if the `:-` separator is missing, an atom is
    /// not parenthesized, a name or attribute is empty, or the body is empty.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);

        let Some((head, body)) = trimmed.split_once(SEPARATOR) else {
            return Err(Error::malformed_rule(text, "missing ':-' separator"));
        };

        let (goal_name, goal_attributes) = parse_atom(head, text)?;

        let mut subgoals = Vec::new();
        for piece in split_top_level(body, ',') {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(Error::malformed_rule(text, "empty subgoal"));
            }
            let (negated, atom) = match piece.strip_prefix("notin") {
                Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
                _ => (false, piece),
            };
            let (name, attributes) = parse_atom(atom, text)?;
            subgoals.push(Subgoal {
                name,
                attributes,
                negated,
            });
        }

        Ok(Self::new(goal_name, goal_attributes, subgoals))
    }

    /// Returns the head relation name.
    #[must_use]
    pub fn goal_name(&self) -> &str {
        &self.goal_name
    }

    /// Returns the head attributes.
    #[must_use]
    pub fn goal_attributes(&self) -> &[Attribute] {
        &self.goal_attributes
    }

    /// Returns the body atoms.
    #[must_use]
    pub fn subgoals(&self) -> &[Subgoal] {
        &self.subgoals
    }

    /// Returns the canonical head text, e.g. `a(X,Y)`.
    #[must_use]
    pub fn head(&self) -> String {
        format!("{}({})", self.goal_name, join_attributes(&self.goal_attributes))
    }

    /// Returns the canonical body text: subgoals comma-joined, negation
    /// spelled `notin ` directly before the name, no other whitespace.
    #[must_use]
    pub fn body(&self) -> String {
        self.subgoals
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns true if both rules have textually identical canonical bodies.
    #[must_use]
    pub fn body_eq(&self, other: &Rule) -> bool {
        self.body() == other.body()
    }

    /// Returns the distinct body variables in first-seen order, scanning
    /// subgoals left to right.
    #[must_use]
    pub fn body_variables(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self
            .subgoals
            .iter()
            .flat_map(|s| s.attributes.iter().filter_map(Attribute::variable))
        {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }

    /// Renders the rule in canonical text form.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {SEPARATOR} {};", self.head(), self.body())
    }
}

impl std::str::FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Parses `name(a1,...,an)`, stripping insignificant whitespace.
fn parse_atom(text: &str, rule: &str) -> Result<(String, Vec<Attribute>)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let Some(open) = compact.find('(') else {
        return Err(Error::malformed_rule(rule, format!("'{compact}' is not parenthesized")));
    };
    let Some(inner) = compact[open + 1..].strip_suffix(')') else {
        return Err(Error::malformed_rule(rule, format!("'{compact}' is missing ')'")));
    };

    let name = &compact[..open];
    if name.is_empty() {
        return Err(Error::malformed_rule(rule, "atom without a relation name"));
    }
    if inner.contains(['(', ')']) {
        return Err(Error::malformed_rule(rule, format!("nested parentheses in '{compact}'")));
    }

    if inner.is_empty() {
        return Ok((name.to_string(), Vec::new()));
    }

    let mut attributes = Vec::new();
    for token in inner.split(',') {
        if token.is_empty() {
            return Err(Error::malformed_rule(rule, format!("empty attribute in '{compact}'")));
        }
        attributes.push(Attribute::parse(token));
    }
    Ok((name.to_string(), attributes))
}

/// Splits on `sep` outside parentheses, braces, and quoted strings.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '{' | '[') => depth += 1,
            (None, ')' | '}' | ']') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}
