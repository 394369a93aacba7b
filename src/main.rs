use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cointracker::services::{
    alert_monitor::AlertMonitor,
    alert_store::AlertStore,
    coingecko::CoinGeckoClient,
    notify::{NotificationSink, Permission, SseNotifier},
    portfolio_store::PortfolioStore,
    user_store::UserStore,
};
use cointracker::storage::KvStore;
use cointracker::{config, routes, templates, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let kv = KvStore::open(&settings.data_dir);
    let alerts = AlertStore::open(kv.clone());
    let portfolio = PortfolioStore::open(kv.clone());
    let users = UserStore::open(kv);

    let coingecko = CoinGeckoClient::new(settings.coingecko_base_url.clone());

    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(16);
    let notifier: Arc<dyn NotificationSink> = Arc::new(SseNotifier::new(events_tx.clone()));

    // Ask for notification capability once, opportunistically; the answer
    // belongs to the host environment, not to us.
    if notifier.is_available() && notifier.permission() == Permission::Default {
        notifier.request_permission();
    }

    let monitor = AlertMonitor::new(
        alerts.clone(),
        Arc::new(coingecko.clone()),
        notifier.clone(),
        Duration::from_secs(settings.alert_poll_secs),
    );
    monitor.start();

    let state = AppState {
        hbs: templates::build_handlebars(),
        settings: settings.clone(),
        coingecko,
        alerts,
        portfolio,
        users,
        notifier,
        monitor,
        events_tx,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
