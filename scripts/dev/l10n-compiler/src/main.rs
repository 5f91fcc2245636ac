use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use phrasekit_runtime::{LocalizationManager, RuntimeConfig};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "l10n-compiler",
    about = "Validates and renders phrasekit localization packs",
    version
)]
struct Cli {
    /// Runtime configuration file (JSON); command-line flags take precedence.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log template cache and locale loading details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load every locale pack and report coverage against the fallback locale.
    Check(CheckArgs),
    /// Render a single message.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Locale pack directory; overrides the configured `locale_dirs`.
    #[arg(value_name = "DIR")]
    directory: Option<PathBuf>,
    /// Locale that other locales are compared against.
    #[arg(long)]
    default_locale: Option<String>,
    /// Exit with an error if any locale lacks a fallback message.
    #[arg(long)]
    fail_on_missing: bool,
    /// JSON key list (`{"locale", "keys"}`) that one locale, the fallback by default, must define.
    #[arg(long, value_name = "FILE")]
    reference: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Dotted message key, e.g. `inbox.count`.
    key: String,
    /// Locale pack directory; overrides the configured `locale_dirs`.
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Locale to render in (defaults to the fallback locale).
    #[arg(long)]
    locale: Option<String>,
    /// Named argument; VALUE is parsed as JSON when possible, otherwise used as text.
    #[arg(long = "arg", value_name = "NAME=VALUE")]
    args: Vec<String>,
    /// Full argument list as JSON: an object for named or an array for positional arguments.
    #[arg(long, value_name = "JSON", conflicts_with = "args")]
    json: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("l10n-compiler error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (config, base) = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Check(args) => check(config, &base, args),
        Command::Render(args) => render(config, &base, args),
    }
}

fn load_config(path: Option<&Path>) -> Result<(RuntimeConfig, PathBuf)> {
    let Some(path) = path else {
        return Ok((RuntimeConfig::default(), PathBuf::from(".")));
    };
    let config = RuntimeConfig::load(path)
        .with_context(|| format!("load configuration {}", path.display()))?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, base))
}

fn load_manager(
    mut config: RuntimeConfig,
    base: &Path,
    directory: Option<PathBuf>,
    default_locale: Option<String>,
) -> Result<LocalizationManager> {
    if let Some(directory) = directory {
        config.locale_dirs = vec![directory];
    }
    if let Some(default_locale) = default_locale {
        config.default_locale = default_locale;
    }
    let dirs = config
        .resolve_dirs(base)
        .iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let manager = LocalizationManager::from_config(&config, base)
        .with_context(|| format!("load localization files from {dirs}"))?;
    tracing::debug!(
        locales = manager.locale_summaries().len(),
        fallback = manager.fallback_code(),
        "localization packs loaded"
    );
    Ok(manager)
}

fn check(config: RuntimeConfig, base: &Path, args: CheckArgs) -> Result<()> {
    let manager = load_manager(config, base, args.directory, args.default_locale)?;
    let fallback = manager
        .fallback_code()
        .ok_or_else(|| anyhow!("no locale files found"))?
        .to_string();
    println!(
        "Loaded {} locale(s); fallback locale: {}",
        manager.locale_summaries().len(),
        fallback
    );

    let mut total_missing = 0usize;
    for stats in manager.catalog_stats() {
        let mut line = format!(
            " - {} [{}]: {} strings ({} plural)",
            stats.display_name, stats.code, stats.total_entries, stats.plural_entries
        );
        if stats.code == fallback {
            line.push_str(" [fallback]");
            println!("{line}");
            continue;
        }

        let missing = manager.missing_keys(&stats.code).unwrap_or_default();
        if missing.is_empty() {
            println!("{line}");
        } else {
            line.push_str(&format!(" - missing {} key(s)", missing.len()));
            println!("{line}");
            for key in missing.iter().take(5) {
                println!("     · {key}");
            }
            if missing.len() > 5 {
                println!("     · ... {} more", missing.len() - 5);
            }
        }
        total_missing += missing.len();
    }

    if total_missing > 0 {
        eprintln!(
            "Found {total_missing} missing localization key(s) relative to fallback '{}'",
            fallback
        );
        if args.fail_on_missing {
            bail!("missing localization keys detected");
        }
    }

    if let Some(reference) = args.reference.as_ref() {
        verify_reference_keys(&manager, reference)?;
    }

    Ok(())
}

fn render(config: RuntimeConfig, base: &Path, args: RenderArgs) -> Result<()> {
    let mut manager = load_manager(config, base, args.dir, None)?;
    if let Some(locale) = args.locale.as_deref() {
        if !manager.set_active_by_code(locale) {
            bail!("locale '{locale}' is not loaded");
        }
    }
    let locale = manager
        .active_code()
        .ok_or_else(|| anyhow!("no locale files found"))?
        .to_string();
    let message_args = match args.json.as_deref() {
        Some(json) => parse_json_args(json)?,
        None => parse_named_args(&args.args)?,
    };

    let message = manager
        .message(&args.key)
        .ok_or_else(|| anyhow!("message '{}' not found in locale '{}'", args.key, locale))?;
    let rendered = message
        .try_call(&message_args)
        .with_context(|| format!("render '{}'", args.key))?;
    println!("{rendered}");
    Ok(())
}

fn parse_json_args(json: &str) -> Result<Vec<Value>> {
    Ok(
        match serde_json::from_str::<Value>(json).context("parse --json arguments")? {
            Value::Array(values) => values,
            other => vec![other],
        },
    )
}

fn parse_named_args(pairs: &[String]) -> Result<Vec<Value>> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }
    let mut named = Map::new();
    for pair in pairs {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("argument '{pair}' must look like NAME=VALUE"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        named.insert(name.to_string(), value);
    }
    Ok(vec![Value::Object(named)])
}

#[derive(Debug, Deserialize)]
struct ReferenceSpec {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    keys: Vec<String>,
}

fn verify_reference_keys(manager: &LocalizationManager, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read localization reference {}", path.display()))?;
    let spec: ReferenceSpec = serde_json::from_str(&contents)
        .with_context(|| format!("parse reference {}", path.display()))?;
    let locale = spec
        .locale
        .or_else(|| manager.fallback_code().map(str::to_string))
        .ok_or_else(|| anyhow!("reference check needs a locale"))?;
    let missing: Vec<&String> = spec
        .keys
        .iter()
        .filter(|key| !manager.locale_has_key(&locale, key))
        .collect();
    if missing.is_empty() {
        match spec.source {
            Some(source) => println!(
                "Reference coverage OK for locale '{}' against {} ({} keys)",
                locale,
                source,
                spec.keys.len()
            ),
            None => println!(
                "Reference coverage OK for locale '{}' ({} keys)",
                locale,
                spec.keys.len()
            ),
        }
        return Ok(());
    }
    eprintln!(
        "Localization reference check failed for locale '{}'; missing {} key(s)",
        locale,
        missing.len()
    );
    for key in missing.iter() {
        eprintln!("  · {key}");
    }
    bail!("reference coverage mismatch detected");
}
