// llfront: LL(1) compiler front end for a C subset

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;

use llfront::diagnostics::Diagnostics;
use llfront::grammar::{Ll1Grammar, TableEntry};
use llfront::parser::{tokenize, PredictiveParser};

/// Lexer, LL(1) table generator, predictive parser and three-address code
/// generator for a small C subset.
#[derive(Parser)]
#[command(name = "llfront", version, about)]
struct Cli {
    /// Grammar file to use instead of the built-in grammar
    #[arg(long, global = true)]
    grammar: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source file and list its tokens
    Tokens {
        /// Path to the C source file
        file: PathBuf,
    },

    /// Show the left-factored and normalized grammar, its sets and the
    /// predictive table
    Grammar,

    /// Parse a source file and print the tree
    Parse {
        /// Path to the C source file
        file: PathBuf,
    },

    /// Run the whole front end and print symbols and three-address code
    Compile {
        /// Path to the C source file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Tokens { file } => tokens(&cli, file),
        Commands::Grammar => grammar(&cli),
        Commands::Parse { file } => parse(&cli, file),
        Commands::Compile { file } => compile(&cli, file),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let level = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("can't read source file {}", path.display()))
}

fn load_grammar(cli: &Cli) -> Result<Ll1Grammar> {
    let Some(path) = &cli.grammar else {
        return Ok(Ll1Grammar::builtin());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("can't read grammar file {}", path.display()))?;
    Ll1Grammar::from_text(&text).with_context(|| format!("invalid grammar in {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    println!("Diagnostics:");
    for message in diagnostics.messages() {
        println!("  {}", message);
    }
}

fn tokens(cli: &Cli, file: &Path) -> Result<()> {
    let source = read_source(file)?;
    let (tokens, diagnostics) = tokenize(&source);

    if cli.json {
        return print_json(&json!({ "tokens": tokens, "diagnostics": diagnostics }));
    }
    for token in &tokens {
        println!("{:>4}  line {:<4} {:<10} {}", token.id, token.line, token.category.as_str(), token.lexeme);
    }
    print_diagnostics(&diagnostics);
    Ok(())
}

fn grammar(cli: &Cli) -> Result<()> {
    let ll1 = load_grammar(cli)?;
    let factored: Vec<String> = ll1.factored().rules().iter().map(ToString::to_string).collect();
    let rules: Vec<String> = ll1.grammar().rules().iter().map(ToString::to_string).collect();

    if cli.json {
        return print_json(&json!({
            "left_factored": factored,
            "normalized": rules,
            "sets": ll1.set_rows(),
            "select": ll1.select_rows(),
            "table": ll1.table(),
            "conflicts": ll1.conflicts(),
        }));
    }

    println!("Left-factored:");
    for rule in &factored {
        println!("      {}", rule);
    }

    println!();
    println!("Normalized:");
    for (index, rule) in rules.iter().enumerate() {
        println!("{:>4}  {}", index, rule);
    }

    println!();
    println!("FIRST / FOLLOW:");
    for row in ll1.set_rows() {
        println!(
            "  {:<24} FIRST {{{}}}  FOLLOW {{{}}}",
            row.nonterminal,
            row.first.join(", "),
            row.follow.join(", ")
        );
    }

    println!();
    println!("SELECT:");
    for row in ll1.select_rows() {
        println!("{:>4}  {:<48} {{{}}}", row.index, row.production, row.select);
    }

    println!();
    println!("Table:");
    for (nonterminal, row) in ll1.table().to_nested() {
        let cells: Vec<String> = row
            .iter()
            .map(|(terminal, entry)| match entry {
                TableEntry::Rule(index) => format!("{}={}", terminal, index),
                TableEntry::Synch => format!("{}=synch", terminal),
            })
            .collect();
        println!("  {:<24} {}", nonterminal, cells.join(" "));
    }

    print_diagnostics(ll1.conflicts());
    Ok(())
}

fn parse(cli: &Cli, file: &Path) -> Result<()> {
    let ll1 = load_grammar(cli)?;
    let source = read_source(file)?;
    let (tokens, mut diagnostics) = tokenize(&source);
    let outcome = PredictiveParser::new(&ll1).parse(&tokens);
    diagnostics.extend(outcome.diagnostics);

    if cli.json {
        return print_json(&json!({
            "tree": outcome.tree,
            "complete": outcome.complete,
            "diagnostics": diagnostics,
        }));
    }
    for line in outcome.tree.render() {
        println!("{}", line);
    }
    print_diagnostics(&diagnostics);
    Ok(())
}

fn compile(cli: &Cli, file: &Path) -> Result<()> {
    let ll1 = load_grammar(cli)?;
    let source = read_source(file)?;
    let result = llfront::compile(&source, &ll1);

    if cli.json {
        return print_json(&serde_json::to_value(&result)?);
    }

    println!("Symbols:");
    for line in result.symbols.render() {
        println!("  {}", line);
    }
    println!();
    println!("Code:");
    for line in result.code.render() {
        println!("  {}", line);
    }
    print_diagnostics(&result.diagnostics);
    Ok(())
}
