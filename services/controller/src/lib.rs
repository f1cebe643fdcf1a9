// Library interface for the wager controller - exposes modules for testing

pub mod balance_store;
pub mod bet_selection;
pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod host;
pub mod notifications;
pub mod presenter;
pub mod retry_strategy;
pub mod settlement_client;

pub use controller::{ControllerEvent, WagerController, WagerState};
pub use settlement_client::{HttpSettlementClient, SettlementApi};
