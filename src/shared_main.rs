use std::{env, path::PathBuf, sync::Arc};

use anyhow::Result;

use crate::{
    data_backend::{create_model, ModelSettings},
    data_types::{RetryPolicy, SamplingConfig},
    db_operations::{MemoryMenuStore, MenuStore, SqliteMenuStore},
    menu_orchestrator::MenuOrchestrator,
    menu_service::MenuService,
    slot_generator::SlotGenerator,
};

pub fn logger_init(module_path: &str) {
    let crate_name = module_path.split("::").next().unwrap_or(module_path);

    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            crate_name,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

/// Everything needed to assemble a [`MenuService`].
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// `None` keeps the menu in memory only.
    pub db_path: Option<PathBuf>,
    pub model: ModelSettings,
    pub retry: RetryPolicy,
    pub sampling: SamplingConfig,
}

pub fn build_menu_service(config: &MenuConfig) -> Result<Arc<MenuService>> {
    let model = create_model(&config.model)?;

    let store: Arc<dyn MenuStore> = match &config.db_path {
        Some(path) => {
            log::info!("Using menu database {}", path.display());
            Arc::new(SqliteMenuStore::open(path)?)
        }
        None => {
            log::warn!("No database configured, menus are kept in memory");
            Arc::new(MemoryMenuStore::default())
        }
    };

    let orchestrator =
        MenuOrchestrator::new(SlotGenerator::new(model, config.retry, config.sampling));

    Ok(Arc::new(MenuService::new(orchestrator, store)))
}
