use clap::{App, Arg, ErrorKind};
use io::Read;
use std::fmt;
use std::fs;
use std::io;
use std::str::FromStr;

use super::CompilerError;
use crate::syntax::Ast;

/// What the compiler prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Asm,
    Types,
    Diagnostics,
}

impl Emit {
    pub fn variants() -> impl Iterator<Item = Emit> {
        [Self::Asm, Self::Types, Self::Diagnostics].iter().copied()
    }
}

impl fmt::Display for Emit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emit::Asm => write!(f, "asm"),
            Emit::Types => write!(f, "types"),
            Emit::Diagnostics => write!(f, "diagnostics"),
        }
    }
}

impl FromStr for Emit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::variants()
            .find(|x| x.to_string() == s)
            .ok_or_else(|| format!("Unknown emit option: `{}`", s))
    }
}

#[derive(Debug, PartialEq)]
pub struct CompilerOptions {
    pub emit: Emit,
    pub filepath: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            emit: Emit::Asm,
            filepath: None,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
pub struct Command {}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON-serialized AST from the input file (or stdin) and
    /// compiles it. `args` includes the program name.
    pub fn run(&self, args: impl Iterator<Item = String>) -> Result<String, CompilerError> {
        let options = parse_options(args)?;

        let src = if let Some(filepath) = options.filepath {
            read_from_file(filepath.as_str())?
        } else {
            read_from_stdin()?
        };
        let ast = Ast::from_json(&src)?;

        super::compile_to(&ast, options.emit)
    }
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<CompilerOptions, CompilerError> {
    let mut options = CompilerOptions::new();

    let emit_possible_values = Emit::variants()
        .map(|e| e.to_string())
        .collect::<Vec<_>>();
    let emit_possible_values: Vec<&str> =
        emit_possible_values.iter().map(AsRef::as_ref).collect();

    let matches = App::new("nimble")
        .about("Compiles a Nimble AST (JSON) to MIPS assembly")
        .arg(
            Arg::with_name("emit")
                .long("emit")
                .takes_value(true)
                .possible_values(&emit_possible_values)
                .help("What to print: assembly, expression types or diagnostics"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the input file to use")
                .required(false)
                .index(1),
        )
        .get_matches_from_safe(args)
        .map_err(|err| match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            _ => CompilerError::InvalidOption(err.message),
        })?;

    if let Some(emit) = matches.value_of("emit") {
        options.emit = emit.parse::<Emit>()?;
    }

    if let Some(filepath) = matches.value_of("INPUT") {
        options.filepath = Some(filepath.to_string());
    }

    Ok(options)
}

fn read_from_stdin() -> Result<String, io::Error> {
    let mut content = String::new();

    io::stdin().read_to_string(&mut content)?;

    Ok(content)
}

fn read_from_file(filename: &str) -> io::Result<String> {
    fs::read_to_string(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(args: &[&str]) -> impl Iterator<Item = String> {
        args.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn default_options() {
        let options = parse_options(args(&["nimble"])).unwrap();
        assert_eq!(options, CompilerOptions::default());
    }

    #[test]
    fn emit_and_input() {
        let options = parse_options(args(&["nimble", "--emit", "types", "prog.json"])).unwrap();

        assert_eq!(options.emit, Emit::Types);
        assert_eq!(options.filepath.as_deref(), Some("prog.json"));
    }

    #[test]
    fn unknown_emit_value() {
        assert_matches!(
            parse_options(args(&["nimble", "--emit", "wasm"])),
            Err(CompilerError::InvalidOption(_))
        );
    }

    #[test]
    fn emit_from_str() {
        assert_eq!("diagnostics".parse::<Emit>(), Ok(Emit::Diagnostics));
        assert!("llvm".parse::<Emit>().is_err());
    }

    #[test]
    fn run_missing_file() {
        let command = Command::new();

        assert_matches!(
            command.run(args(&["nimble", "/nonexistent/prog.json"])),
            Err(CompilerError::InputSourceError(_))
        );
    }
}
