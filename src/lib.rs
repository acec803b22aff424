pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod db_operations;
pub mod default_meals;
pub mod diversity;
pub mod errors;
pub mod meal_sanitizer;
pub mod menu_orchestrator;
pub mod menu_service;
pub mod shared_main;
pub mod slot_generator;
pub mod task_scheduler_funcs;
