//! Blaze CLI
//!
//! Command-line interface for building, running and transpiling .blaze
//! programs.

use blazec::{BuildError, Command, CompilerConfig, Driver, Outcome, Report};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "blaze")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Blaze build tool - transpile .blaze programs to Go and compile them", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Configuration file (defaults to ./blaze.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .blaze file to an executable
    Build {
        /// Input .blaze source file (defaults to main.blaze)
        file: Option<PathBuf>,
    },

    /// Compile a .blaze file, then run it and print its output
    Run {
        /// Input .blaze source file (defaults to main.blaze)
        file: Option<PathBuf>,
    },

    /// Write the generated Go source next to the .blaze file
    Transpile {
        /// Input .blaze source file (defaults to main.blaze)
        file: Option<PathBuf>,
    },

    /// Anything else is reported as an invalid command
    #[command(external_subcommand)]
    Other(Vec<OsString>),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = run(cli, &mut io::stdout());
    process::exit(code);
}

/// Execute one CLI invocation, writing results to `out`, and return the exit code
fn run(cli: Cli, out: &mut dyn Write) -> i32 {
    let (token, file) = match cli.command {
        None => (None, None),
        Some(Commands::Build { file }) => (Some("build".to_string()), file),
        Some(Commands::Run { file }) => (Some("run".to_string()), file),
        Some(Commands::Transpile { file }) => (Some("transpile".to_string()), file),
        Some(Commands::Other(args)) => {
            let token = args
                .first()
                .map(|a| a.to_string_lossy().into_owned())
                .unwrap_or_default();
            (Some(token), None)
        }
    };

    // Reject unknown commands before touching the filesystem, config included
    let command = match Command::parse(token.as_deref(), file) {
        Ok(command) => command,
        Err(e) => {
            report_line(out, &e.to_string());
            return e.exit_code();
        }
    };

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return e.exit_code();
        }
    };

    let report = Driver::new(config).dispatch(&command);
    print_report(&report, out);
    report.exit_code()
}

fn load_config(explicit: Option<&Path>) -> Result<CompilerConfig, BuildError> {
    match explicit {
        Some(path) => CompilerConfig::load(path),
        None => CompilerConfig::discover(Path::new(".")),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["blazec", "blaze"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_report(report: &Report, out: &mut dyn Write) {
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }

    match &report.result {
        Ok(Outcome::Built { source, executable }) => report_line(
            out,
            &format!("Compiled {} -> {}", source.display(), executable.display()),
        ),
        Ok(Outcome::Ran { output, .. }) => {
            if let Err(e) = out.write_all(output.as_bytes()).and_then(|_| out.flush()) {
                eprintln!("Error writing program output: {}", e);
            }
        }
        Ok(Outcome::Transpiled { source, artifact }) => report_line(
            out,
            &format!("Transpiled {} -> {}", source.display(), artifact.display()),
        ),
        Err(e) => eprintln!("{}", e),
    }
}

fn report_line(out: &mut dyn Write, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        eprintln!("Error writing output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn listing(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut entries: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path();
                let contents = fs::read(&path).unwrap();
                (path, contents)
            })
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unknown_command_is_captured() {
        let cli = Cli::try_parse_from(["blaze", "foo", "bar.blaze"]).unwrap();
        match cli.command {
            Some(Commands::Other(args)) => assert_eq!(args, vec!["foo", "bar.blaze"]),
            _ => panic!("Expected external subcommand"),
        }
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["blaze"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_with_file_and_flags() {
        let cli = Cli::try_parse_from(["blaze", "-vv", "run", "app.blaze"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Run { file }) => assert_eq!(file, Some(PathBuf::from("app.blaze"))),
            _ => panic!("Expected run"),
        }
    }

    #[test]
    fn test_help_token_is_an_unknown_command() {
        let cli = Cli::try_parse_from(["blaze", "help"]).unwrap();
        match cli.command {
            Some(Commands::Other(args)) => assert_eq!(args, vec!["help"]),
            _ => panic!("Expected external subcommand"),
        }
    }

    #[test]
    #[serial]
    fn test_invalid_command_leaves_directory_untouched() {
        let temp = tempdir().unwrap();
        // Loading this config would fail, so reaching it changes the exit code
        fs::write(temp.path().join(CompilerConfig::FILE_NAME), "bogus = true\n").unwrap();
        fs::write(temp.path().join("bar.blaze"), "println(1)!\n").unwrap();
        let before = listing(temp.path());

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();
        let cli = Cli::try_parse_from(["blaze", "foo", "bar.blaze"]).unwrap();
        let mut out = Vec::new();
        let code = run(cli, &mut out);
        std::env::set_current_dir(original).unwrap();

        assert_eq!(code, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Invalid command 'foo'. Use 'run', 'build' or 'transpile'.\n"
        );
        assert_eq!(listing(temp.path()), before);
    }

    #[test]
    #[serial]
    fn test_help_without_file_reports_invalid_command() {
        let temp = tempdir().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();
        let cli = Cli::try_parse_from(["blaze", "help"]).unwrap();
        let mut out = Vec::new();
        let code = run(cli, &mut out);
        std::env::set_current_dir(original).unwrap();

        assert_eq!(code, 2);
        assert!(String::from_utf8(out).unwrap().starts_with("Invalid command 'help'."));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
