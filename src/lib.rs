pub mod board;
pub mod cli;
pub mod config;
pub mod display;
pub mod fetcher;
pub mod logging;
pub mod opensky;
pub mod renderer;
pub mod thread_manager;
pub mod types;
