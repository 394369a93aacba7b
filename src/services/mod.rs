pub mod coingecko;
pub mod notify;

pub mod alert_store;
pub mod alert_monitor;

pub mod auth_service;
pub mod portfolio_service;
pub mod portfolio_store;
pub mod user_service;
pub mod user_store;
