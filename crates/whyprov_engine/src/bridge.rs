//! Evaluation bridge: hands the program to an [`Evaluator`] and freezes what
//! comes back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use whyprov_foundation::Result;
use whyprov_storage::ResultsTable;

use crate::evaluator::{EvaluationOutput, Evaluator, ProgramInput};

/// The frozen outcome of one evaluation run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Program text as sent to the evaluator.
    pub program: Vec<String>,
    /// Relation names in definition order.
    pub relations: Vec<String>,
    /// The raw result stream.
    pub result_lines: Vec<String>,
    /// The result stream parsed per relation.
    pub results: ResultsTable,
}

impl Evaluation {
    /// Runs `evaluator` on `input` and parses its result stream.
    ///
    /// # Errors
    ///
    /// Propagates evaluator errors and `MalformedResultStream`.
    pub fn run(evaluator: &dyn Evaluator, input: &ProgramInput<'_>) -> Result<Self> {
        info!(rules = input.rules.len(), relations = input.schema.len(), "running evaluation");
        let output = evaluator.evaluate(input)?;
        Self::from_output(output)
    }

    /// Parses the artifacts returned by an evaluator.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResultStream` if the result lines do not parse.
    pub fn from_output(output: EvaluationOutput) -> Result<Self> {
        let results = ResultsTable::parse_lines(&output.results)?;
        debug!(
            program = output.program.len(),
            relations = output.relations.len(),
            lines = output.results.len(),
            "froze evaluation results"
        );
        Ok(Self {
            program: output.program,
            relations: output.relations,
            result_lines: output.results,
            results,
        })
    }
}
