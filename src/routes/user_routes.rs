use crate::{controllers::user_controller, AppState};
use axum::{routing::{get, post}, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/settings", get(user_controller::get_settings))
        .route("/settings/username", post(user_controller::post_change_username))
        .route("/settings/password", post(user_controller::post_change_password))
}
