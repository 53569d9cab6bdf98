#![allow(dead_code)]

use crate::config::{load_config, load_options, ConfigError, Options, OptionsOverride};
use clap::{Parser, ValueHint};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod generate;

#[derive(Debug, Parser)]
#[command(
    name = "subforge",
    about = "Post-process a Clash/Mihomo subscription configuration"
)]
struct ProgramArgs {
    /// Base configuration file produced by the subscription converter.
    #[clap(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Output file; writes to stdout when omitted.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
    /// Options file (YAML, camelCase keys); flag overrides apply on top.
    #[arg(long, value_hint = ValueHint::FilePath)]
    options: Option<PathBuf>,
    /// Enabled service keys: "all" or a ;/,-separated list.
    #[arg(long, value_hint = ValueHint::Other)]
    rule_set: Option<String>,
    /// Enabled region prefixes: "all" or a ;/,-separated list.
    #[arg(long, value_hint = ValueHint::Other)]
    region_set: Option<String>,
    /// DNS mode preset: securest, secure, default, fast or fastest.
    #[arg(long, value_hint = ValueHint::Other)]
    mode: Option<String>,
    /// Bypass the pipeline entirely and echo the input configuration.
    #[arg(long)]
    disable: bool,
}

fn init_tracing() -> Result<(), ConfigError> {
    let stdout_layer = fmt::layer().compact().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(
                    Directive::from_str("subforge=info")
                        .map_err(|_| ConfigError::Internal("Tracing filter"))?,
                )
                .from_env_lossy(),
        )
        .init();
    Ok(())
}

fn flag_overrides(args: &ProgramArgs) -> OptionsOverride {
    OptionsOverride {
        enable: args.disable.then_some(false),
        rule_set: args.rule_set.clone(),
        region_set: args.region_set.clone(),
        mode: args.mode.clone(),
        ..Default::default()
    }
}

fn process(args: &ProgramArgs) -> anyhow::Result<()> {
    let overrides = match &args.options {
        Some(path) => load_options(path)?,
        None => OptionsOverride::default(),
    };
    let opts = Options::resolve(&overrides.overlay(flag_overrides(args)));

    let cfg = load_config(&args.input)?;
    let augmented = generate::run(cfg, &opts)?;

    let text = serde_yaml::to_string(&augmented)?;
    match &args.output {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = ProgramArgs::parse();
    if init_tracing().is_err() {
        eprintln!("Failed to initialize logging");
        return ExitCode::FAILURE;
    }
    match process(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("{e}").red());
            ExitCode::FAILURE
        }
    }
}
