pub mod announcer;
pub mod app_error;
pub mod celebration;
pub mod config;
pub mod cook_actions;
pub mod data_manager;
pub mod display;
pub mod events;
pub mod grocery_list;
pub mod key_bindings;
pub mod models;
pub mod recipe_parser;
pub mod session_stats;
pub mod session_tracker;
pub mod share;
pub mod step_sequencer;
