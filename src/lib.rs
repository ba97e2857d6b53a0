pub mod aircraft;
pub mod airport;
pub mod assign;
pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod exact;
pub mod flight;
pub mod logging;
pub mod rule;
pub mod scenario;
pub mod tat;
pub mod time;
