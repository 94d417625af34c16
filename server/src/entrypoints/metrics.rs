use std::sync::Arc;

use lockedin_server::api::prometheus::PrometheusClient;
use rocket::{http::ContentType, State};

#[get("/metrics")]
async fn metrics(prometheus: &State<Arc<PrometheusClient>>) -> Option<(ContentType, String)> {
    let metrics = match prometheus.encode() {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::error!("Failed to encode metrics: {e}");
            return None;
        }
    };
    Some((
        ContentType::new("application/openmetrics-text", " version=1.0.0; charset=utf-8"),
        metrics,
    ))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing metrics entrypoint", |rocket| async {
        rocket.mount("/", rocket::routes![metrics])
    })
}
