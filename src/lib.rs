// Library exports for the Halite bot
// This allows the replay tool and the integration tests to use the core bot logic

pub mod behavior;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod grid;
pub mod planner;
pub mod protocol;
pub mod replay;
pub mod resolver;
pub mod search;
pub mod spawn;
pub mod types;
