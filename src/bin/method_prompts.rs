use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use method_prompts::catalog::{catalog, find_task};
use method_prompts::config::{load_given, load_methods, parse_assignment, parse_tx_assignment, select_method, Settings};
use method_prompts::invoke::DryRunTransport;
use method_prompts::{default_registry, invoke, Given, Handlers, InvokeStatus, MethodSpec, TerminalPrompt};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "method-prompts")]
#[command(about = "Resolve contract method arguments from flags, prompts and defaults")]
struct CliOptions {
    /// Settings file (TOML); defaults to $METHOD_PROMPTS_SETTINGS or ~/.method-prompts/settings.toml
    #[arg(long = "settings", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered argument types
    Types,
    /// List the built-in tasks
    Tasks,
    /// Resolve a method's arguments and invoke it (dry run)
    Run(RunOptions),
}

#[derive(Args, Debug)]
struct RunOptions {
    /// Built-in task to run (see `tasks`)
    #[arg(long = "task", conflicts_with = "method")]
    task: Option<String>,

    /// YAML/JSON file declaring the method(s)
    #[arg(long = "method", short = 'm')]
    method: Option<PathBuf>,

    /// Method name inside the method file
    #[arg(long = "name", requires = "method")]
    name: Option<String>,

    /// Target contract address or deployment reference
    #[arg(long = "target", default_value = "")]
    target: String,

    /// JSON object of given argument values (use '-' for stdin)
    #[arg(long = "given")]
    given: Option<String>,

    /// Given argument as name=value (repeatable)
    #[arg(long = "arg", short = 'a')]
    args: Vec<String>,

    /// JSON object of given tx options
    #[arg(long = "tx-given")]
    tx_given: Option<String>,

    /// Given tx option as key=value; key=default forces the configured default
    #[arg(long = "tx")]
    tx: Vec<String>,

    /// Fail instead of prompting for missing or invalid values
    #[arg(long = "non-interactive", action = ArgAction::SetTrue)]
    non_interactive: bool,

    /// Log the resolved call before invoking it
    #[arg(long = "verbose", short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(InvokeStatus::Succeeded) => {}
        Ok(InvokeStatus::Failed) => std::process::exit(2),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<InvokeStatus> {
    let opts = CliOptions::parse();
    let settings = Settings::discover(opts.settings.as_deref())?;
    let registry = default_registry(settings.address_book());

    match opts.command {
        Command::Types => {
            for (tag, description) in registry.describe() {
                println!("{tag:<16} {description}");
            }
            Ok(InvokeStatus::Succeeded)
        }
        Command::Tasks => {
            for task in catalog() {
                println!("{:<32} {}", task.name, task.description);
            }
            Ok(InvokeStatus::Succeeded)
        }
        Command::Run(run) => {
            let method = load_method(&run)?;
            let given = collect_given(&run)?;
            let non_interactive = run.non_interactive || settings.non_interactive;
            let mut ctx = registry
                .context(Box::new(TerminalPrompt::new()), non_interactive)
                .with_verbose(run.verbose || settings.verbose);
            let mut transport = DryRunTransport;

            let mut failure = None;
            let status = invoke(
                &mut ctx,
                &mut transport,
                &run.target,
                &method,
                &given,
                Handlers::new()
                    .on_success(|result: Value| {
                        match serde_json::to_string_pretty(&result) {
                            Ok(text) => println!("{text}"),
                            Err(err) => eprintln!("Error: {err}"),
                        }
                    })
                    .on_error(|err| failure = Some(err.to_string())),
            );
            if let Some(message) = failure {
                eprintln!("There was an error while running {}: {message}", method.name);
            }
            Ok(status)
        }
    }
}

fn load_method(run: &RunOptions) -> Result<MethodSpec> {
    if let Some(task) = &run.task {
        return find_task(task)
            .map(|task| task.method)
            .ok_or_else(|| anyhow!("unknown task: {task}"));
    }
    let path = run
        .method
        .as_ref()
        .ok_or_else(|| anyhow!("either --task or --method is required"))?;
    let methods = load_methods(path)?;
    select_method(methods, run.name.as_deref())
}

fn collect_given(run: &RunOptions) -> Result<Given> {
    let mut given = Given::default();
    if let Some(source) = &run.given {
        given.arguments = load_given(source)?;
    }
    if let Some(source) = &run.tx_given {
        given.tx_options = load_given(source)?;
    }
    for raw in &run.args {
        let (name, value) = parse_assignment(raw).with_context(|| "invalid --arg")?;
        given.arguments.insert(name, value);
    }
    for raw in &run.tx {
        let (name, value) = parse_tx_assignment(raw).with_context(|| "invalid --tx")?;
        given.tx_options.insert(name, value);
    }
    Ok(given)
}
