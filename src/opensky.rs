pub mod client;
mod constants;
pub mod states;

pub use client::OpenSkyClient;
pub use constants::DEFAULT_BASE_URL;
