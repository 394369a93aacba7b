use crate::{controllers::coins_controller, AppState};
use axum::{routing::get, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/coins/:id/detail", get(coins_controller::get_coin_detail))
        .route("/coins/:id/chart", get(coins_controller::get_coin_chart))
}
