use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget};
use std::future::Future;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{CatalogClient, Fetch, HttpFetcher, DEFAULT_BASE_URL};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::pagination::Paginator;
use crate::render::TermRenderer;
use crate::session::{Affordances, LoadMore, Session};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_TOTAL_CAP: u32 = 250;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Config(String),

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build runtime: {source}")]
    RuntimeBuild {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read command input: {source}")]
    Stdin {
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub base_url: String,
    pub page_size: u32,
    pub total_cap: u32,
    pub timeout_seconds: u64,
    pub lookup: Option<String>,
    pub no_color: bool,
}

fn print_banner() {
    println!();
    println!(
        "  {} v{} - terminal creature catalog",
        "critterdex".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

pub fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, AppError> {
    validation::validate(&args).map_err(AppError::InvalidArgs)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    let total_cap = args.total_cap.or(cfg.total_cap).unwrap_or(DEFAULT_TOTAL_CAP);
    let timeout_seconds = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    if page_size == 0 {
        return Err(AppError::InvalidArgs(
            "invalid page_size, expected positive integer".to_string(),
        ));
    }
    if total_cap == 0 {
        return Err(AppError::InvalidArgs(
            "invalid total_cap, expected positive integer".to_string(),
        ));
    }

    Ok(RunConfig {
        base_url,
        page_size,
        total_cap,
        timeout_seconds,
        lookup: args.lookup,
        no_color,
    })
}

async fn with_spinner<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    let out = fut.await;
    pb.finish_and_clear();
    out
}

fn affordance_hint(affordances: &Affordances) -> String {
    let mut parts: Vec<&str> = Vec::new();
    match affordances.load_more {
        LoadMore::Ready => parts.push("[more] next page"),
        LoadMore::Retry => parts.push("[more] retry failed load"),
        LoadMore::Busy => parts.push("loading..."),
        LoadMore::Hidden => {}
    }
    if affordances.show_reset {
        parts.push("[reset] show all");
    }
    parts.push("[help] commands");
    parts.join("  ")
}

fn print_help() {
    println!("commands:");
    println!("  more                load the next page of records");
    println!("  search <text>       filter loaded records by name substring,");
    println!("                      or look one up directly if nothing is loaded");
    println!("  category [name]     filter loaded records by category; no name clears it");
    println!("  detail <id|name>    show the detail view for one record");
    println!("  reset               clear filters and reload from the start");
    println!("  cache               show how many responses are memoized");
    println!("  quit                exit");
}

async fn interactive_loop<F: Fetch>(
    session: &mut Session<F, TermRenderer>,
) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{}", affordance_hint(&session.affordances()).dimmed());
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines
            .next_line()
            .await
            .map_err(|e| AppError::Stdin { source: e })?
        {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => continue,
            "more" | "m" => {
                with_spinner("loading records...", session.load_more()).await;
                if session.paginator().is_exhausted() {
                    println!(":: all {} record(s) loaded", session.store().len());
                }
            }
            "search" | "s" => {
                with_spinner("searching...", session.search(rest)).await;
            }
            "category" | "c" => {
                let category = if rest.is_empty() {
                    None
                } else {
                    Some(rest.to_string())
                };
                session.set_category(category);
            }
            "detail" | "d" => {
                if rest.is_empty() {
                    println!("usage: detail <id|name>");
                    continue;
                }
                with_spinner("fetching record...", session.show_detail(rest)).await;
            }
            "reset" | "r" => {
                with_spinner("reloading...", session.reset()).await;
            }
            "cache" => {
                println!(
                    ":: {} response(s) memoized for this session",
                    session.client().cache().len().await
                );
            }
            "help" | "h" | "?" => print_help(),
            "quit" | "exit" | "q" => break,
            other => println!("unknown command '{other}', type help for the command list"),
        }
    }

    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), AppError> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let transport = HttpFetcher::new(run.timeout_seconds)
        .map_err(|e| AppError::HttpClientBuild { source: e })?;
    let client = CatalogClient::new(run.base_url.clone(), transport);
    let paginator = Paginator::new(run.page_size, run.total_cap);
    let mut session = Session::new(client, paginator, TermRenderer::new());

    if let Some(identifier) = run.lookup.as_deref() {
        with_spinner("fetching record...", session.show_detail(identifier)).await;
        return Ok(());
    }

    print_banner();
    format_kv_line("Source", session.client().base_url());
    format_kv_line(
        "Paging",
        &format!("page_size={} total_cap={}", run.page_size, run.total_cap),
    );
    format_kv_line("HTTP", &format!("timeout={}s", run.timeout_seconds));
    println!();

    with_spinner("loading records...", session.initial_load()).await;

    interactive_loop(&mut session).await
}

pub fn run_cli() -> Result<(), AppError> {
    let args = CliArgs::parse();

    let cfg = match args.config.as_deref() {
        Some(path) => {
            config::load_config(&config::expand_tilde(path), false).map_err(AppError::Config)?
        }
        None => match config::default_config_path() {
            Some(path) => {
                // Scaffold a commented config on first run; a failure here is
                // not fatal, the defaults still apply.
                if let Err(e) = config::ensure_default_config_file(&path) {
                    eprintln!("warning: {e}");
                }
                config::load_config(&path, true).map_err(AppError::Config)?
            }
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::RuntimeBuild { source: e })?;

    rt.block_on(run_async(run))
}
