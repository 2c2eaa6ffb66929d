//! Session state for one provenance batch.
//!
//! A session collects schemas, base facts, and rules, evaluates them exactly
//! once together with their synthesized provenance rules, and then answers
//! provenance queries against the frozen results.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use whyprov_debug::{ProvenanceConfig, RenderGraph};
use whyprov_engine::{
    DEFAULT_MAX_ITERATIONS, Evaluation, Evaluator, ProgramInput, ProvenanceGraph, ProvenanceSynthesizer,
    StratifiedEvaluator, TreeBuilder,
};
use whyprov_foundation::{Error, ErrorContext, ErrorKind, Result, ScalarType, Tuple, Value};
use whyprov_language::{Rule, Statement, parse_program};
use whyprov_storage::{FactStore, ResultsTable, SchemaRegistry};

use crate::serialize::EvaluationSnapshot;

/// Session-level settings.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Fixpoint iteration cap handed to the built-in evaluator.
    pub max_iterations: usize,
    /// Rendering and `.dot` output options.
    pub provenance: ProvenanceConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            provenance: ProvenanceConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Builder method to set the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder method to set the provenance output options.
    #[must_use]
    pub fn with_provenance(mut self, provenance: ProvenanceConfig) -> Self {
        self.provenance = provenance;
        self
    }
}

/// State of one evaluation batch.
pub struct Session {
    /// Declared schemas, provenance relations included once synthesized.
    schema: SchemaRegistry,

    /// Base facts.
    facts: FactStore,

    /// Original rules followed, after `run`, by their provenance rules.
    rules: Vec<Rule>,

    /// Provenance rule counter.
    synthesizer: ProvenanceSynthesizer,

    /// The datalog evaluator.
    evaluator: Box<dyn Evaluator>,

    /// The frozen evaluation, present after `run`.
    evaluation: Option<Evaluation>,

    config: SessionConfig,
}

impl Session {
    /// Creates an empty session with the built-in evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Creates an empty session with the given configuration.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        let evaluator = StratifiedEvaluator::new().with_max_iterations(config.max_iterations);
        Self {
            schema: SchemaRegistry::new(),
            facts: FactStore::new(),
            rules: Vec::new(),
            synthesizer: ProvenanceSynthesizer::new(),
            evaluator: Box::new(evaluator),
            evaluation: None,
            config,
        }
    }

    /// Replaces the evaluator, e.g. with an adapter for an external engine.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Restores an evaluated session from a snapshot.
    ///
    /// The restored session answers provenance queries but cannot be
    /// evaluated again.
    #[must_use]
    pub fn from_snapshot(snapshot: EvaluationSnapshot, config: SessionConfig) -> Self {
        let mut session = Self::with_config(config);
        session.schema = snapshot.schema;
        session.rules = snapshot.rules;
        session.evaluation = Some(snapshot.evaluation);
        session
    }

    /// Captures the evaluated session for later provenance queries.
    ///
    /// # Errors
    ///
    /// Returns `NotEvaluated` before `run`.
    pub fn snapshot(&self) -> Result<EvaluationSnapshot> {
        Ok(EvaluationSnapshot {
            schema: self.schema.clone(),
            rules: self.rules.clone(),
            evaluation: self.evaluation()?.clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Building the batch
    // -------------------------------------------------------------------------

    /// Declares the column types of `relation`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEvaluated` after `run`.
    pub fn declare_schema(&mut self, relation: impl Into<String>, types: Vec<ScalarType>) -> Result<()> {
        self.ensure_open()?;
        self.schema.declare(relation, types);
        Ok(())
    }

    /// Adds one base fact. Returns false if it was already present.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEvaluated` after `run`.
    pub fn insert_fact(&mut self, relation: impl Into<String>, values: Vec<Value>) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.facts.insert(relation, values))
    }

    /// Adds the cartesian product of per-column values, first column
    /// varying fastest. Returns the number of new facts.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEvaluated` after `run`.
    pub fn insert_product(&mut self, relation: impl Into<String>, columns: Vec<Vec<Value>>) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.facts.insert_product(relation, columns))
    }

    /// Parses and registers a rule.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRule` for bad rule text and `AlreadyEvaluated`
    /// after `run`.
    pub fn add_rule(&mut self, text: &str) -> Result<()> {
        self.ensure_open()?;
        let rule = Rule::parse(text)?;
        debug!(rule = %rule, "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Loads program text: `define` statements, facts, and rules. Returns
    /// the number of statements loaded.
    ///
    /// # Errors
    ///
    /// Returns `MalformedProgram` or `MalformedRule` for bad statements and
    /// `AlreadyEvaluated` after `run`. Nothing is loaded if any statement
    /// fails to parse.
    pub fn load_program(&mut self, text: &str) -> Result<usize> {
        self.ensure_open()?;
        let statements = parse_program(text)?;
        let count = statements.len();
        for statement in statements {
            match statement {
                Statement::Define { relation, types } => self.schema.declare(relation, types),
                Statement::Fact { relation, values } => {
                    self.facts.insert(relation, values);
                }
                Statement::Rule(rule) => self.rules.push(rule),
            }
        }
        info!(statements = count, rules = self.rules.len(), "loaded program");
        Ok(count)
    }

    /// Loads a program file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read, and any error of
    /// [`load_program`](Self::load_program) with the path in its context.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::new(ErrorKind::IoError(format!("{}: {e}", path.display()))))?;
        self.load_program(&text).map_err(|e| {
            let context = e
                .context
                .clone()
                .unwrap_or_else(ErrorContext::new)
                .with_source(path.display().to_string());
            e.with_context(context)
        })
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Synthesizes provenance rules, evaluates the whole program, and freezes
    /// the results.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEvaluated` on a second call, any synthesis error
    /// (the session is left unevaluated), and any evaluator error.
    pub fn run(&mut self) -> Result<&Evaluation> {
        self.ensure_open()?;

        let mut schema = self.schema.clone();
        let mut synthesizer = self.synthesizer.clone();
        let provenance = synthesizer.synthesize_all(&self.rules, &mut schema)?;

        let mut rules = self.rules.clone();
        rules.extend(provenance);

        let input = ProgramInput {
            schema: &schema,
            facts: &self.facts,
            rules: &rules,
        };
        let evaluation = Evaluation::run(self.evaluator.as_ref(), &input)?;
        info!(
            relations = evaluation.relations.len(),
            lines = evaluation.result_lines.len(),
            "session evaluated"
        );

        self.schema = schema;
        self.synthesizer = synthesizer;
        self.rules = rules;
        Ok(self.evaluation.insert(evaluation))
    }

    /// Returns true once the session has been evaluated.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Returns the frozen evaluation.
    ///
    /// # Errors
    ///
    /// Returns `NotEvaluated` before `run`.
    pub fn evaluation(&self) -> Result<&Evaluation> {
        self.evaluation
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NotEvaluated))
    }

    /// Returns the parsed results.
    ///
    /// # Errors
    ///
    /// Returns `NotEvaluated` before `run`.
    pub fn results(&self) -> Result<&ResultsTable> {
        Ok(&self.evaluation()?.results)
    }

    // -------------------------------------------------------------------------
    // Provenance queries
    // -------------------------------------------------------------------------

    /// Returns true if `tuple` is among the results of `relation`.
    ///
    /// # Errors
    ///
    /// Returns `NotEvaluated` before `run`.
    pub fn verify(&self, relation: &str, tuple: &Tuple) -> Result<bool> {
        Ok(self.tree_builder()?.verify(relation, tuple))
    }

    /// Builds the provenance graph of `tuple` in `relation`.
    ///
    /// # Errors
    ///
    /// Returns `NotEvaluated` before `run`, `TupleNotFound` if the tuple is
    /// not in the results, and any error raised while building.
    pub fn provenance(&self, relation: &str, tuple: &Tuple) -> Result<ProvenanceGraph> {
        self.tree_builder()?.explain(relation, tuple)
    }

    /// Builds the provenance graph and, if enabled, writes it to
    /// `<save_path>.dot`.
    ///
    /// # Errors
    ///
    /// Any error of [`provenance`](Self::provenance), and `IoError` if the
    /// file cannot be written.
    pub fn generate_provenance(&self, relation: &str, tuple: &Tuple, save_path: &Path) -> Result<ProvenanceGraph> {
        let graph = self.provenance(relation, tuple)?;
        if self.config.provenance.write_dot {
            let mut target = save_path.as_os_str().to_owned();
            target.push(".dot");
            graph.write_dot(Path::new(&target), &self.config.provenance)?;
        }
        Ok(graph)
    }

    fn tree_builder(&self) -> Result<TreeBuilder<'_>> {
        let evaluation = self.evaluation()?;
        Ok(TreeBuilder::new(&evaluation.results, &self.rules))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.evaluation.is_some() {
            return Err(Error::new(ErrorKind::AlreadyEvaluated));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the schema registry.
    #[must_use]
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Returns the base facts.
    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Returns every declared rule, original rules first.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the synthesized provenance rules.
    pub fn provenance_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_provenance)
    }

    /// Returns the number of provenance rules synthesized so far.
    #[must_use]
    pub fn provenance_counter(&self) -> u64 {
        self.synthesizer.counter()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
