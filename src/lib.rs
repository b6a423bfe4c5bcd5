pub mod api;
pub mod app;
pub mod chain;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod order;
pub mod price;
pub mod state;
pub mod view;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testkit;
