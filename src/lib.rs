//! Library entrypoint for cointracker.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

use std::sync::Arc;

pub mod config;
pub mod models;
pub mod storage;

// Keep these modules at crate root because the codebase already references
// them as `crate::auth`, `crate::render`, and `crate::templates`.
#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
pub mod templates;

pub mod controllers;
pub mod routes;

use services::{
    alert_monitor::AlertMonitor, alert_store::AlertStore, coingecko::CoinGeckoClient,
    notify::NotificationSink, portfolio_store::PortfolioStore, user_store::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub coingecko: CoinGeckoClient,
    pub alerts: AlertStore,
    pub portfolio: PortfolioStore,
    pub users: UserStore,
    pub notifier: Arc<dyn NotificationSink>,
    pub monitor: AlertMonitor,
    pub events_tx: tokio::sync::broadcast::Sender<String>,
}
