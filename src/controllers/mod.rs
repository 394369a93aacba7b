pub mod alerts_controller;
pub mod auth_controller;
pub mod coins_controller;
pub mod home_controller;
pub mod portfolio_controller;
pub mod realtime_controller;
pub mod user_controller;
