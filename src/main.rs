//! prodsys CLI: forward and backward chaining over a JSON knowledge base.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use production_system::engine::{Engine, EngineConfig, Verdict};
use production_system::infer::{AntecedentPolicy, Strategy};
use production_system::loader::{load_config, load_knowledge_base, load_task};

#[derive(Parser)]
#[command(name = "prodsys", version, about = "Propositional production system")]
struct Cli {
    /// Engine configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Let backward chaining derive antecedents recursively instead of
    /// requiring them to be true already.
    #[arg(long, global = true)]
    derivable: bool,

    /// Ceiling on forward-chaining rounds.
    #[arg(long, global = true)]
    max_rounds: Option<usize>,

    /// Ceiling on backward-chaining recursion depth.
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Print verdicts as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a knowledge base and print a summary.
    Check {
        /// Knowledge base file.
        #[arg(short = 'f', long)]
        kb: PathBuf,
    },

    /// Data-driven inference for one task.
    Forward {
        /// Knowledge base file.
        #[arg(short = 'f', long)]
        kb: PathBuf,
        /// Task file with `true_facts` and `query`.
        #[arg(long)]
        task: PathBuf,
    },

    /// Goal-driven inference for one task.
    Backward {
        /// Knowledge base file.
        #[arg(short = 'f', long)]
        kb: PathBuf,
        /// Task file with `true_facts` and `query`.
        #[arg(long)]
        task: PathBuf,
    },

    /// Run a forward task and a backward task against the same knowledge base.
    Run {
        /// Knowledge base file.
        #[arg(short = 'f', long, default_value = "test.json")]
        kb: PathBuf,
        /// Task for forward chaining.
        #[arg(long, default_value = "forward.json")]
        forward: PathBuf,
        /// Task for backward chaining.
        #[arg(long, default_value = "backward.json")]
        backward: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = engine_config(&cli)?;

    match &cli.command {
        Commands::Check { kb } => {
            let kb = load_knowledge_base(kb)?;
            println!("{kb}");
            for (_, fact) in kb.facts() {
                println!("  fact {:<16} {}", fact.name, fact.semantic_value);
            }
            for (_, rule) in kb.rules() {
                let conditionals: Vec<&str> = rule
                    .conditionals
                    .iter()
                    .map(|&c| kb.fact(c).name.as_str())
                    .collect();
                println!(
                    "  rule {:<16} [{}] -> {}",
                    rule.name,
                    conditionals.join(", "),
                    kb.fact(rule.derivation).name
                );
            }
        }

        Commands::Forward { kb, task } => {
            let engine = build_engine(kb, config)?;
            run_task(&engine, Strategy::Forward, task, cli.json)?;
        }

        Commands::Backward { kb, task } => {
            let engine = build_engine(kb, config)?;
            run_task(&engine, Strategy::Backward, task, cli.json)?;
        }

        Commands::Run {
            kb,
            forward,
            backward,
        } => {
            let engine = build_engine(kb, config)?;
            run_task(&engine, Strategy::Forward, forward, cli.json)?;
            run_task(&engine, Strategy::Backward, backward, cli.json)?;
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if cli.derivable {
        config.backward.policy = AntecedentPolicy::Derivable;
    }
    if cli.max_rounds.is_some() {
        config.forward.max_rounds = cli.max_rounds;
    }
    if cli.max_depth.is_some() {
        config.backward.max_depth = cli.max_depth;
    }
    Ok(config)
}

fn build_engine(kb: &Path, config: EngineConfig) -> Result<Engine> {
    let kb = load_knowledge_base(kb)?;
    Ok(Engine::new(Arc::new(kb), config))
}

fn run_task(engine: &Engine, strategy: Strategy, task: &Path, json: bool) -> Result<()> {
    let task = load_task(task)?;
    let verdict = engine.infer(strategy, &task.true_facts, &task.query)?;
    print_verdict(strategy, &verdict, json)
}

fn print_verdict(strategy: Strategy, verdict: &Verdict, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "strategy": strategy,
            "derived": verdict.derived,
            "used_rules": verdict.used_rules,
        });
        println!("{}", serde_json::to_string(&value).into_diagnostic()?);
    } else {
        println!("[{strategy}] :: {verdict}");
    }
    Ok(())
}
