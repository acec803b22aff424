use daily_menu_rs::constants::{
    DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS,
    MAX_RETRIES, MENU_DB,
};
use daily_menu_rs::data_backend::ModelSettings;
use daily_menu_rs::data_types::{ManualMenuRequest, Provider, RetryPolicy, SamplingConfig};
use daily_menu_rs::menu_service::MenuService;
use daily_menu_rs::shared_main::{build_menu_service, logger_init, MenuConfig};
use daily_menu_rs::task_scheduler_funcs::RegenerationScheduler;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::log_enabled;
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Keeps one AI-generated Turkish menu (breakfast, lunch, dinner) for today.
/// {n}The menu is regenerated every night at local midnight and whenever a stale menu is read.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// SQLite file holding the current menu
    #[arg(long, env = "MENU_DB", default_value = MENU_DB)]
    db: PathBuf,
    /// Keep the menu in memory instead of SQLite
    #[arg(long)]
    in_memory: bool,
    /// Model backend used for generation
    #[arg(long, env = "MENU_PROVIDER", value_enum, default_value_t = Provider::Ollama)]
    provider: Provider,
    /// Ollama API host{n}Example: <http://127.0.0.1:11434/api>
    #[arg(long, env = "OLLAMA_HOST")]
    ollama_host: Option<String>,
    /// Ollama model for inference
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
    ollama_model: String,
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    /// Gemini model for inference
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    gemini_model: String,
    /// Timeout of a single model request, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Additional attempts per slot before falling back to default meals
    #[arg(long, default_value_t = MAX_RETRIES)]
    max_retries: u32,
    /// Base delay between attempts; the n-th retry waits n times this long
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,
    /// Enable verbose logging (generated menus, timings){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate nightly and keep today's menu fresh until Ctrl-C (default)
    Serve,
    /// Print today's menu as JSON, generating it if it is missing or stale
    Today,
    /// Replace the current menu, either freshly generated or from a JSON file
    Regenerate {
        /// Partial menu `{ "breakfast": {..}, "lunch": {..}, "dinner": {..} }`
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

impl Args {
    fn menu_config(&self) -> MenuConfig {
        MenuConfig {
            db_path: (!self.in_memory).then(|| self.db.clone()),
            model: ModelSettings {
                provider: self.provider,
                ollama_host: self.ollama_host.clone(),
                ollama_model: self.ollama_model.clone(),
                gemini_api_key: self.gemini_api_key.clone(),
                gemini_model: self.gemini_model.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_delay: Duration::from_millis(self.retry_delay_ms),
            },
            sampling: SamplingConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    //// Args setup
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());

    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for generated menus and timings");
    }

    let service = build_menu_service(&args.menu_config())?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(service).await,
        Command::Today => print_json(&service.get_today_menu().await?),
        Command::Regenerate { from: None } => print_json(&service.regenerate_menu().await?),
        Command::Regenerate { from: Some(path) } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let request: ManualMenuRequest = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            print_json(&service.replace_with_manual(&request)?)
        }
    }
}

async fn serve(service: Arc<MenuService>) -> Result<()> {
    log::info!("Starting menu service...");

    let scheduler = RegenerationScheduler::start(service.clone()).await?;

    // warm up so the first reader does not wait for generation
    match service.get_today_menu().await {
        Ok(menu) => log::info!("Menu for {} is ready", menu.date),
        Err(e) => log::error!("Could not prepare today's menu: {}", e),
    }

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down...");
    scheduler.shutdown().await
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
