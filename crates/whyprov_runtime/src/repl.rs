//! The interactive REPL.
//!
//! Input ending in `;` is program text; anything else is a command:
//!
//! ```text
//! why> define(b,{int}); b(1);
//! why> a(X) :- b(X);
//! why> why a(1)
//! ```

use std::path::Path;

use whyprov_debug::RenderGraph;
use whyprov_foundation::{Error, ErrorKind, Result, ScalarType, Tuple};

use crate::editor::{LineEditor, ReadResult, RustylineEditor, open_depth};
use crate::session::Session;

/// Splits an atom such as `a(0,"str10")` into its relation and tuple.
///
/// # Errors
///
/// Returns `MalformedRule` if the text is not `name(...)`.
pub fn parse_atom(text: &str) -> Result<(String, Tuple)> {
    let text = text.trim();
    let malformed = |reason: &str| Error::malformed_rule(text, reason);

    let open = text.find('(').ok_or_else(|| malformed("expected 'relation(values)'"))?;
    let relation = text[..open].trim();
    let inner = text[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing ')'"))?;
    if relation.is_empty() {
        return Err(malformed("missing relation name"));
    }
    Ok((relation.to_string(), Tuple::parse(inner)))
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The batch being built and queried.
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            show_banner: true,
            prompt: "why> ".to_string(),
            continuation_prompt: "...> ".to_string(),
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            println!("\x1b[1mwhyprov\x1b[0m {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));
        }

        while let Some(input) = self.read_input()? {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.editor.add_history(trimmed);
            if matches!(trimmed, "quit" | "exit") {
                break;
            }
            match self.eval(trimmed) {
                Ok(output) if !output.is_empty() => println!("{}", output.trim_end()),
                Ok(_) => {}
                Err(e) => eprintln!("\x1b[31mError: {e}\x1b[0m"),
            }
        }

        println!();
        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        loop {
            let prompt = if input.is_empty() {
                &self.prompt
            } else {
                &self.continuation_prompt
            };
            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if !input.is_empty() {
                        input.push('\n');
                    }
                    input.push_str(&line);
                    if open_depth(&input) <= 0 {
                        return Ok(Some(input));
                    }
                }
                ReadResult::Interrupted => return Ok(Some(String::new())),
                ReadResult::Eof if input.is_empty() => return Ok(None),
                ReadResult::Eof => {
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in multi-line input".to_string(),
                    )));
                }
            }
        }
    }

    /// Evaluates one input and returns what it prints.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing command or program statement.
    pub fn eval(&mut self, input: &str) -> Result<String> {
        let input = input.trim();
        if input.ends_with(';') {
            let count = self.session.load_program(input)?;
            return Ok(format!("loaded {count} statement(s)"));
        }

        let (command, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();
        match command {
            "why" => {
                self.ensure_evaluated()?;
                let (relation, tuple) = parse_atom(rest)?;
                Ok(self.session.provenance(&relation, &tuple)?.to_tree())
            }
            "render" => {
                let (atom, path) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| Error::malformed_rule(rest, "usage: render <atom> <path>"))?;
                self.ensure_evaluated()?;
                let (relation, tuple) = parse_atom(atom)?;
                let graph = self.session.provenance(&relation, &tuple)?;
                let target = format!("{path}.dot");
                graph.write_dot(Path::new(&target), &self.session.config().provenance)?;
                Ok(format!("saved {} nodes to {target}", graph.node_count()))
            }
            "run" => {
                let evaluation = self.session.run()?;
                Ok(format!("evaluated {} relation(s)", evaluation.relations.len()))
            }
            "results" => {
                let evaluation = self.session.evaluation()?;
                if rest.is_empty() {
                    return Ok(evaluation.result_lines.join("\n"));
                }
                let tuples: Vec<String> = evaluation.results.tuples(rest).map(Tuple::to_line).collect();
                Ok(tuples.join("\n"))
            }
            "program" => Ok(self.session.evaluation()?.program.join("\n")),
            "rules" => Ok(self
                .session
                .rules()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
            "relations" => Ok(self
                .session
                .schema()
                .iter()
                .map(|(relation, types)| {
                    let types: Vec<_> = types.iter().map(ScalarType::as_str).collect();
                    format!("{relation}({})", types.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n")),
            "help" => Ok(HELP.to_string()),
            other => Err(Error::new(ErrorKind::Internal(format!(
                "unknown command '{other}' (program text must end with ';')"
            )))),
        }
    }

    fn ensure_evaluated(&mut self) -> Result<()> {
        if !self.session.is_evaluated() {
            self.session.run()?;
        }
        Ok(())
    }
}

const HELP: &str = "\
program text          any input ending in ';' (define, facts, rules)
why <atom>            explain a result tuple, e.g. why a(0,1)
render <atom> <path>  write the provenance graph to <path>.dot
run                   evaluate the batch (why/render do this on first use)
results [relation]    show the result stream or one relation
program               show the evaluated program text
rules                 list rules, provenance rules included
relations             list declared schemas
quit                  leave the REPL";
