use crate::{controllers::realtime_controller, AppState};
use axum::{routing::get, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/events", get(realtime_controller::sse_events))
}
