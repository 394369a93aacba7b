use crate::{controllers::alerts_controller, AppState};
use axum::{routing::{get, post}, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/alerts", get(alerts_controller::get_alerts_page))
        .route("/alerts/list", get(alerts_controller::get_alerts_list))
        .route("/alerts/:id", post(alerts_controller::post_set_alert))
        .route("/alerts/:id/target", get(alerts_controller::get_alert_target))
        .route("/alerts/:id/delete", post(alerts_controller::post_delete_alert))
}
