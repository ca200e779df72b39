mod calibrate;
mod classify;
mod cli;
mod error_fmt;

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    if let Err(err) = run() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(1);
    }
}

fn run() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let text = std::fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("reading config {}", cli.config.display()))?;
    let mut cfg = weighid_config::load_toml(&text).wrap_err("parsing config TOML")?;
    cfg.validate().wrap_err("invalid configuration")?;

    // Relative paths in the config are relative to the config file.
    let base = cli
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    cfg.store.path = resolve(&base, &cfg.store.path);

    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging, &base)?;
    tracing::debug!(config = %cli.config.display(), store = %cfg.store.path.display(), "config loaded");

    match cli.cmd {
        Commands::Show => calibrate::show(&cfg, cli.json),
        Commands::SetObject {
            slot,
            weight,
            tolerance,
        } => calibrate::set_object(&cfg, slot, weight, tolerance, cli.json),
        Commands::SetOffset { offset } => calibrate::set_offset(&cfg, offset, cli.json),
        Commands::Import { csv } => calibrate::import(&cfg, csv.as_deref(), cli.json),
        Commands::Classify {
            input,
            all,
            paced,
            max_samples,
        } => classify::classify(
            &cfg,
            &classify::ClassifyArgs {
                input,
                all,
                paced,
                max_samples,
            },
            cli.json,
        ),
        Commands::Health => calibrate::health(&cfg, cli.json),
    }
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Console logs go to stderr (JSON when `--json`); `[logging].file` adds a
/// JSON-lines file sink whose writer guard is kept in `FILE_GUARD`.
/// `RUST_LOG` wins over `--log-level` and `[logging].level`.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &weighid_config::Logging,
    base: &Path,
) -> eyre::Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let json_console = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let pretty_console =
        (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = resolve(base, Path::new(file));
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(&dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(&dir, name),
                _ => tracing_appender::rolling::never(&dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_console)
        .with(pretty_console)
        .with(file_layer)
        .try_init()
        .wrap_err("installing tracing subscriber")?;
    Ok(())
}
