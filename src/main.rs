mod logging;

use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use msikit::error::{ErrorKind, Result};
use msikit::{Config, Session};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

/// Allocate Windows Installer identifiers, short names and directories.
#[derive(Debug, Parser)]
#[command(name = "msikit", version, about)]
struct Cli {
    /// More output on stderr (repeat for more); `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file (TOML, YAML or JSON) layered over the user configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Seed the session from a `Directory.idt` archive.
    #[arg(long, global = true)]
    import: Option<PathBuf>,
    /// Write the resulting `Directory` table to an archive when done.
    #[arg(long, global = true)]
    export: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Allocate identifiers within a context (table).
    Id {
        #[arg(long)]
        context: String,
        /// Overrides the configured length limit for the context.
        #[arg(long)]
        max_length: Option<usize>,
        /// Extra text that keeps equal names apart.
        #[arg(long)]
        extra: Option<String>,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Generate 8.3 short names.
    Short {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Resolve target paths to `Directory` identifiers.
    Resolve {
        /// Make the final directory of each path a public property.
        #[arg(long)]
        public: bool,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print the `Directory` table as an archive.
    Table,
}

/// Runs one command against `session`, returning what to print.
fn execute(session: &mut Session, command: Command) -> Result<String> {
    let mut output = String::new();
    match command {
        Command::Id { context, max_length, extra, names } => {
            for name in names {
                let id = session.allocate(&context, &name, max_length, extra.as_deref())?;
                let _ = writeln!(output, "{name}\t{id}");
            }
        },
        Command::Short { names } => {
            for name in names {
                let short = session.shorten(&name)?;
                let _ = writeln!(output, "{name}\t{short}");
            }
        },
        Command::Resolve { public, paths } => {
            for path in paths {
                let id = session.resolve(&path, public)?;
                let _ = writeln!(output, "{path}\t{id}");
            }
        },
        Command::Table => {
            let mut archive = Vec::new();
            session.export_directories(&mut archive)?;
            output.push_str(&String::from_utf8_lossy(&archive));
        },
    }
    Ok(output)
}

fn run(cli: Cli) -> Result<String> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let mut session = Session::new(config);
    if let Some(path) = &cli.import {
        let rows = session.import_file(path)?;
        tracing::info!(path = %path.display(), rows, "Imported directory table");
    }
    let output = execute(&mut session, cli.command)?;
    if let Some(path) = &cli.export {
        session.export_file(path)?;
        tracing::info!(path = %path.display(), rows = session.directories().len(), "Exported directory table");
    }
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("msikit").chain(args.iter().copied())).unwrap()
    }

    fn execute_args(session: &mut Session, args: &[&str]) -> String {
        execute(session, parse(args).command).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["id", "Foo"])]
    #[case(&["id", "--context", "File"])]
    #[case(&["short"])]
    #[case(&["resolve"])]
    #[case(&["frobnicate"])]
    fn test_invalid_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(std::iter::once("msikit").chain(args.iter().copied())).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["short", "-vv", "--import", "in.idt", "Readme.txt"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.import, Some(PathBuf::from("in.idt")));
        assert!(cli.export.is_none());
    }

    #[test]
    fn test_id_command() {
        let mut session = Session::default();
        let output = execute_args(&mut session, &["id", "--context", "File", "Foo9", "foo9"]);
        assert_eq!(output, "Foo9\tFoo9\nfoo9\tFoo9\n");
        let output = execute_args(&mut session, &["id", "--context", "File", "--extra", "x", "Foo9"]);
        assert_eq!(output, "Foo9\tFoo10\n");
        let output = execute_args(&mut session, &["id", "--context", "File", "--max-length", "4", "Abcdefgh"]);
        assert_eq!(output, "Abcdefgh\tAbcd\n");
    }

    #[test]
    fn test_short_command() {
        let mut session = Session::default();
        let output = execute_args(&mut session, &["short", "LongFile1.txt", "LongFile2.txt", "README.TXT"]);
        assert_eq!(output, "LongFile1.txt\tLONGFI~1.TXT\nLongFile2.txt\tLONGFI~2.TXT\nREADME.TXT\tREADME.TXT\n");
    }

    #[test]
    fn test_resolve_and_table_commands() {
        let mut session = Session::default();
        let output = execute_args(&mut session, &["resolve", "--public", "ProgramFilesFolder/My App"]);
        assert_eq!(output, "ProgramFilesFolder/My App\tMYAPP\n");
        let table = execute_args(&mut session, &["table"]);
        assert!(table.starts_with("Directory\tDirectory_Parent\tDefaultDir\r\n"));
        assert!(table.ends_with("MYAPP\tProgramFilesFolder\tMYAPP~1|My App\r\n"));
    }

    #[test]
    fn test_run_imports_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.idt");
        let second = dir.path().join("second.idt");

        let cli = parse(&["resolve", "--export", first.to_str().unwrap(), "ProgramFilesFolder/Vendor/bin"]);
        assert_eq!(run(cli).unwrap(), "ProgramFilesFolder/Vendor/bin\tbin\n");

        let cli = parse(&[
            "resolve",
            "--import",
            first.to_str().unwrap(),
            "--export",
            second.to_str().unwrap(),
            "ProgramFilesFolder/Vendor/bin",
            "ProgramFilesFolder/Other/bin",
        ]);
        assert_eq!(run(cli).unwrap(), "ProgramFilesFolder/Vendor/bin\tbin\nProgramFilesFolder/Other/bin\tbin_1\n");

        let mut session = Session::default();
        assert_eq!(session.import_file(&second).unwrap(), 6);
    }

    #[test]
    fn test_run_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("missing.toml");
        let err = run(parse(&["--config", config.to_str().unwrap(), "table"])).unwrap_err();
        assert_eq!(*err, ErrorKind::Config);
    }
}
