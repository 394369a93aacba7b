use crate::{controllers::portfolio_controller, AppState};
use axum::{routing::{get, post}, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/portfolio", get(portfolio_controller::get_portfolio_page).post(portfolio_controller::post_add_holding))
        .route("/portfolio/positions", get(portfolio_controller::get_positions))
        .route("/portfolio/:id/delete", post(portfolio_controller::post_delete_holding))
}
