// lsd: tokenize, parse, check, run or compile LSD programs

use clap::{Parser as ClapParser, Subcommand};
use lsd::codegen::{self, IrGenerator};
use lsd::config::FrontendConfig;
use lsd::frontend::{Frontend, ParseOutcome};
use lsd::interpreter::engine::Interpreter;
use lsd::lexer::keywords::KeywordMatch;
use lsd::parser::tree;
use lsd::semantic;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(version, about = "Toolchain for the LSD teaching language", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated keyword list (overrides the config file)
    #[arg(long, global = true, value_delimiter = ',')]
    keywords: Option<Vec<String>>,

    /// Match keywords regardless of case
    #[arg(long, global = true)]
    case_insensitive: bool,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream
    Tokens {
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// Include comments and layout separators
        #[arg(long)]
        all: bool,
    },
    /// Parse and print the syntax tree
    Parse {
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse and run semantic analysis
    Check {
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Check and execute a program
    Run { file: PathBuf },
    /// Check and emit LLVM IR
    EmitIr {
        file: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target triple (host if omitted)
        #[arg(long)]
        target: Option<String>,
    },
    /// Show statistics of the combined lexical automaton
    Dfa,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn load_config(args: &Args) -> Result<FrontendConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => FrontendConfig::load(path)?,
        None => FrontendConfig::default(),
    };
    if let Some(keywords) = &args.keywords {
        config.keywords = keywords.clone();
    }
    if args.case_insensitive {
        config.keyword_match = KeywordMatch::CaseInsensitive;
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String, Box<dyn Error>> {
    fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e).into())
}

/// Parse `path`, printing diagnostics. `None` if any front-end error occurred.
fn parse_file(frontend: &Frontend, path: &Path) -> Result<Option<ParseOutcome>, Box<dyn Error>> {
    let source = read_source(path)?;
    let outcome = frontend.parse(&source)?;
    report_front_end(&outcome);
    Ok((!outcome.has_errors()).then_some(outcome))
}

fn report_front_end(outcome: &ParseOutcome) {
    for error in &outcome.lex_errors {
        eprintln!("Lexical error: {}", error);
    }
    for error in &outcome.parse_errors {
        eprintln!("{}", error);
    }
}

/// Returns whether the command succeeded without diagnostics.
fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let config = load_config(&args)?;
    let frontend = Frontend::new(&config);

    match args.command {
        Commands::Tokens { file, json, all } => {
            let source = read_source(&file)?;
            let stream = frontend.tokenize(&source)?;
            let tokens = if all {
                stream.tokens.clone()
            } else {
                stream.significant()
            };
            if json {
                let value = serde_json::json!({ "tokens": tokens, "errors": stream.errors });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for token in &tokens {
                    println!(
                        "{:>4}:{:<3} {:<10} {}",
                        token.location.line,
                        token.location.column,
                        token.category,
                        token.lexeme.escape_debug()
                    );
                }
                for error in &stream.errors {
                    eprintln!("Lexical error: {}", error);
                }
            }
            Ok(stream.errors.is_empty())
        }
        Commands::Parse { file, json } => {
            let source = read_source(&file)?;
            let outcome = frontend.parse(&source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", tree::render(&outcome.program));
                report_front_end(&outcome);
            }
            Ok(!outcome.has_errors())
        }
        Commands::Check { file, json } => {
            let Some(outcome) = parse_file(&frontend, &file)? else {
                return Ok(false);
            };
            let analysis = semantic::analyze(&outcome.program);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                for (name, ty) in &analysis.symbols {
                    println!("{:<20} {}", name, ty);
                }
                report_analysis(&analysis);
            }
            Ok(analysis.is_ok())
        }
        Commands::Run { file } => {
            let Some(outcome) = parse_file(&frontend, &file)? else {
                return Ok(false);
            };
            let analysis = semantic::analyze(&outcome.program);
            report_analysis(&analysis);
            if !analysis.is_ok() {
                return Ok(false);
            }

            let mut interpreter = Interpreter::new();
            let result = interpreter.run(&outcome.program);
            for line in interpreter.output() {
                println!("{}", line);
            }
            match result {
                Ok(()) => Ok(true),
                Err(e) => {
                    eprintln!("{}", e);
                    Ok(false)
                }
            }
        }
        Commands::EmitIr {
            file,
            output,
            target,
        } => {
            let Some(outcome) = parse_file(&frontend, &file)? else {
                return Ok(false);
            };
            let analysis = semantic::analyze(&outcome.program);
            report_analysis(&analysis);
            if !analysis.is_ok() {
                return Ok(false);
            }

            let triple = target.unwrap_or_else(codegen::host_triple);
            let module = IrGenerator::new(triple).generate(&outcome.program)?;
            match output {
                Some(path) => {
                    fs::write(&path, module)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => print!("{}", module),
            }
            Ok(true)
        }
        Commands::Dfa => {
            println!("{}", serde_json::to_string_pretty(&frontend.dfa().stats())?);
            Ok(true)
        }
    }
}

fn report_analysis(analysis: &semantic::Analysis) {
    for warning in &analysis.warnings {
        eprintln!("Warning: {}", warning);
    }
    for error in &analysis.errors {
        eprintln!("Semantic error: {}", error);
    }
}
