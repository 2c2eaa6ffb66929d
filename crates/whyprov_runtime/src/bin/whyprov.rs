//! whyprov CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use whyprov_debug::{ProvenanceConfig, RenderGraph};
use whyprov_runtime::{Repl, Session, SessionConfig, load_from_file, parse_atom, save_to_file};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    why: Vec<String>,
    out: Option<PathBuf>,
    dump_program: bool,
    dump_results: bool,
    save_results: Option<PathBuf>,
    load_results: Option<PathBuf>,
    batch_mode: bool,
    verbosity: u8,
    legend: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value_of(args: &[String], i: &mut usize, flag: &str) -> Result<String, Box<dyn std::error::Error>> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "-v" | "--verbose" => config.verbosity += 1,
            "-vv" => config.verbosity += 2,
            "--legend" => config.legend = true,
            "--dump-program" => config.dump_program = true,
            "--dump-results" => config.dump_results = true,
            "--why" => config.why.push(value_of(&args, &mut i, "--why")?),
            "--out" => config.out = Some(PathBuf::from(value_of(&args, &mut i, "--out")?)),
            "--save-results" => {
                config.save_results = Some(PathBuf::from(value_of(&args, &mut i, "--save-results")?));
            }
            "--load-results" => {
                config.load_results = Some(PathBuf::from(value_of(&args, &mut i, "--load-results")?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
        i += 1;
    }

    Ok(config)
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbosity > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("whyprov {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(config.verbosity);

    let provenance = ProvenanceConfig::default()
        .with_legend(config.legend)
        .with_write_dot(config.out.is_some());
    let session_config = SessionConfig::default().with_provenance(provenance);

    let mut session = if let Some(path) = &config.load_results {
        if !config.files.is_empty() {
            return Err("--load-results cannot be combined with program files".into());
        }
        Session::from_snapshot(load_from_file(path)?, session_config)
    } else {
        let mut session = Session::with_config(session_config);
        for file in &config.files {
            session.load_file(file)?;
        }
        session
    };

    let evaluate_now = config.dump_program
        || config.dump_results
        || config.save_results.is_some()
        || !config.why.is_empty();
    if evaluate_now && !session.is_evaluated() {
        session.run()?;
    }

    if config.dump_program {
        println!("\x1b[1;36m=== Program ===\x1b[0m");
        for line in &session.evaluation()?.program {
            println!("{line}");
        }
        println!();
    }

    if config.dump_results {
        println!("\x1b[1;36m=== Results ===\x1b[0m");
        for line in &session.evaluation()?.result_lines {
            println!("{line}");
        }
        println!();
    }

    if let Some(path) = &config.save_results {
        save_to_file(&session.snapshot()?, path)?;
        eprintln!("Saved results to {}", path.display());
    }

    for (index, atom) in config.why.iter().enumerate() {
        let (relation, tuple) = parse_atom(atom)?;
        let graph = match &config.out {
            Some(base) => {
                let base = if config.why.len() > 1 {
                    PathBuf::from(format!("{}_{index}", base.display()))
                } else {
                    base.clone()
                };
                let graph = session.generate_provenance(&relation, &tuple, &base)?;
                eprintln!("Saving provenance graph to {}.dot", base.display());
                graph
            }
            None => session.provenance(&relation, &tuple)?,
        };
        print!("{}", graph.to_tree());
    }

    if config.batch_mode || !config.why.is_empty() {
        return Ok(());
    }

    let mut repl = Repl::new()?.with_session(session);
    if !config.files.is_empty() || config.load_results.is_some() {
        repl = repl.without_banner();
    }
    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mwhyprov\x1b[0m - Why-provenance for datalog programs

\x1b[1mUSAGE:\x1b[0m
    whyprov [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Program files (define, fact, and rule statements) to load

\x1b[1mOPTIONS:\x1b[0m
    -h, --help              Print help information
    -V, --version           Print version information
    -b, --batch             Load files and exit (no REPL)
    -v, --verbose           Log more (repeat or use -vv for debug output)

\x1b[1mPROVENANCE OPTIONS:\x1b[0m
    --why ATOM              Explain a result tuple, e.g. --why 'a(0,1)' (repeatable)
    --out PATH              Also write each graph to PATH.dot
    --legend                Add a shape legend to written graphs
    --dump-program          Print the evaluated program text
    --dump-results          Print the evaluator's result stream
    --save-results FILE     Save the evaluated session to FILE
    --load-results FILE     Explain against a saved session instead of evaluating

\x1b[1mEXAMPLES:\x1b[0m
    whyprov join.dl                                 Load join.dl, then start REPL
    whyprov --why 'a(0,1)' join.dl                  Print the derivation of a(0,1)
    whyprov --why 'a(0,1)' --out why join.dl        Also write why.dot
    whyprov -b --save-results join.msgpack join.dl  Evaluate once and save
    whyprov --load-results join.msgpack --why 'a(0,1)'

\x1b[1mREPL COMMANDS:\x1b[0m
    <statement>;            Load program text
    why <atom>              Explain a result tuple
    render <atom> <path>    Write the graph to <path>.dot
    results [relation]      Show results
    program | rules | relations | help | quit
    Ctrl+D                  Exit REPL
    Ctrl+C                  Cancel current input

RUST_LOG overrides the default log filter (warn)."
    );
}
