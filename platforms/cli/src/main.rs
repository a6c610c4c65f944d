use clap::Parser;
use std::io::{self, Read};
use std::path::Path;
use std::process;
use std::str::FromStr;
use tracing::{info, warn, Level};
use utm::loader::ProgramLoader;
use utm::programs::ProgramManager;
use utm::{
    lint, parse, MachineConfig, Outcome, Trace, UniversalMachine, UtmError, DEFAULT_MAX_STEPS,
};

/// Runs a machine encoded in unary binary on the universal Turing machine.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  utm-cli machines/even-length.utm
  echo 10010101101010001 | utm-cli --trace
  utm-cli --builtin bounce --json")]
struct Cli {
    /// Path to an encoded program file (.utm).
    /// Can also pipe the encoding via stdin.
    program: Option<String>,

    /// Run a built-in program by name
    #[clap(short, long, conflicts_with = "program")]
    builtin: Option<String>,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,

    /// Maximum number of transitions applied before the input is rejected
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Print the initial configuration and every step of the run
    #[clap(short = 'd', long)]
    trace: bool,

    /// Print the result as JSON
    #[clap(long)]
    json: bool,

    /// Log level written to stderr (trace, debug, info, warn, error)
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let level = match Level::from_str(&cli.log_level) {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Error: invalid log level '{}'", cli.log_level);
            process::exit(2);
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    if cli.list {
        for (name, description) in ProgramManager::list() {
            println!("{:<16}{}", name, description);
        }
        return;
    }

    let encoding = match read_encoding(&cli) {
        Ok(encoding) => encoding,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let report = run(&cli, &encoding);
    if let Some(stdout) = &report.stdout {
        println!("{}", stdout);
    }
    if let Some(stderr) = &report.stderr {
        eprintln!("{}", stderr);
    }

    process::exit(report.outcome.exit_code());
}

/// What a run prints, and how it ended.
struct Report {
    stdout: Option<String>,
    stderr: Option<String>,
    outcome: Outcome,
}

/// Decodes the encoding once, lints it, runs it, and renders the result.
fn run(cli: &Cli, encoding: &str) -> Report {
    let config = MachineConfig::with_max_steps(cli.max_steps);
    let program = parse(encoding);
    if let Ok(program) = &program {
        for warning in lint(program) {
            warn!("{}", warning);
        }
        info!(max_steps = config.max_steps, "Running program");
    }

    if cli.trace {
        let trace = match program {
            Ok(program) => Trace::record(&program, &config),
            Err(error) => Trace::malformed(encoding, error),
        };

        // the trace ends with its own result line
        let (stdout, stderr) = if cli.json {
            render_json(trace.to_json())
        } else {
            let stderr = match &trace.outcome {
                Outcome::Malformed(_) => Some(describe(&trace.outcome, &config)),
                _ => None,
            };
            (Some(trace.to_string()), stderr)
        };

        return Report {
            stdout,
            stderr,
            outcome: trace.outcome,
        };
    }

    let outcome = match program {
        Ok(program) => UniversalMachine::new(&program, config).run(),
        Err(error) => Outcome::Malformed(error),
    };

    let (stdout, stderr) = if cli.json {
        render_json(serde_json::to_string_pretty(&outcome))
    } else {
        match &outcome {
            Outcome::Malformed(_) => (None, Some(describe(&outcome, &config))),
            _ => (Some(describe(&outcome, &config)), None),
        }
    };

    Report {
        stdout,
        stderr,
        outcome,
    }
}

/// Reads the encoding from a built-in program, a file, or piped stdin.
fn read_encoding(cli: &Cli) -> Result<String, UtmError> {
    if let Some(name) = &cli.builtin {
        Ok(ProgramManager::get_program_by_name(name)?
            .encoding()
            .to_string())
    } else if let Some(path) = &cli.program {
        ProgramLoader::read_encoding(Path::new(path))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| UtmError::File(format!("Failed to read from stdin: {}", e)))?;
        Ok(ProgramLoader::clean(&buffer)?)
    } else {
        Err(UtmError::File(
            "No program given; pass a file, --builtin NAME, or pipe the encoding via stdin"
                .to_string(),
        ))
    }
}

fn render_json(json: Result<String, serde_json::Error>) -> (Option<String>, Option<String>) {
    match json {
        Ok(json) => (Some(json), None),
        Err(e) => (None, Some(format!("Error: failed to serialize result: {}", e))),
    }
}

/// The human-readable verdict for an outcome.
fn describe(outcome: &Outcome, config: &MachineConfig) -> String {
    match outcome {
        Outcome::Accepted => "accepted".to_string(),
        Outcome::RejectedHalted => "rejected, stopped in a non-final state".to_string(),
        Outcome::RejectedCapExceeded => {
            format!("rejected, reached {} iterations", config.max_steps)
        }
        Outcome::Malformed(e) => format!("Error: malformed program: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utm::FormatError;

    #[test]
    fn test_describe_outcomes() {
        let config = MachineConfig::with_max_steps(50);

        assert_eq!(describe(&Outcome::Accepted, &config), "accepted");
        assert_eq!(
            describe(&Outcome::RejectedHalted, &config),
            "rejected, stopped in a non-final state"
        );
        assert_eq!(
            describe(&Outcome::RejectedCapExceeded, &config),
            "rejected, reached 50 iterations"
        );
        assert!(describe(&Outcome::Malformed(FormatError::Empty), &config)
            .starts_with("Error: malformed program"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["utm-cli", "--builtin", "bounce", "-m", "20", "-d"]);

        assert_eq!(cli.builtin.as_deref(), Some("bounce"));
        assert_eq!(cli.max_steps, 20);
        assert!(cli.trace);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_trace_prints_a_single_verdict() {
        let cli = Cli::parse_from(["utm-cli", "-d"]);
        let report = run(&cli, "10010101101010001");

        let stdout = report.stdout.unwrap();
        assert_eq!(stdout.matches("result: rejected_halted").count(), 1);
        assert!(!stdout.contains("rejected, stopped in a non-final state"));
        assert_eq!(report.stderr, None);
        assert_eq!(report.outcome, Outcome::RejectedHalted);
    }

    #[test]
    fn test_run_verdicts() {
        let cli = Cli::parse_from(["utm-cli", "-m", "5"]);

        let report = run(&cli, "0010110110110100110110101101000");
        assert_eq!(
            report.stdout.as_deref(),
            Some("rejected, reached 5 iterations")
        );
        assert_eq!(report.outcome.exit_code(), 1);

        let report = run(&cli, "1001");
        assert_eq!(report.stdout, None);
        assert!(report.stderr.unwrap().starts_with("Error: malformed program"));
        assert_eq!(report.outcome.exit_code(), 2);
    }

    #[test]
    fn test_malformed_trace_reports_error() {
        let cli = Cli::parse_from(["utm-cli", "-d"]);
        let report = run(&cli, "1001");

        assert!(report.stdout.unwrap().contains("result: malformed"));
        assert!(report.stderr.is_some());
        assert_eq!(report.outcome.exit_code(), 2);
    }

    #[test]
    fn test_json_outcome() {
        let cli = Cli::parse_from(["utm-cli", "--json"]);
        let report = run(&cli, "110010101101010001");

        let json: serde_json::Value = serde_json::from_str(&report.stdout.unwrap()).unwrap();
        assert_eq!(json["result"], "accepted");
        assert_eq!(report.outcome, Outcome::Accepted);
    }

    #[test]
    fn test_read_builtin_encoding() {
        let cli = Cli::parse_from(["utm-cli", "--builtin", "single-step"]);
        assert_eq!(read_encoding(&cli).unwrap(), "10010101101010001");

        let cli = Cli::parse_from(["utm-cli", "--builtin", "missing"]);
        assert!(matches!(
            read_encoding(&cli),
            Err(UtmError::UnknownProgram(_))
        ));
    }
}
