use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assign::{Channel, HardwareKind};
use crate::display::visible;
use crate::refresh::{RefreshCoordinator, RefreshOutcome, SyncStatus};
use crate::settings::{AppSettings, SettingsStore};

pub struct AppState {
    pub coordinator: Arc<RefreshCoordinator>,
    pub store: SettingsStore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    date: Option<String>,
    title: Option<String>,
    series: Option<String>,
    status: SyncStatus,
    last_updated: String,
    mics: Vec<Channel>,
    monitors: Vec<Channel>,
}

// Board endpoint, filtered to the configured visible ranges
async fn get_board(state: web::Data<AppState>) -> Result<HttpResponse> {
    let settings = state.coordinator.settings();
    let board = state.coordinator.board();

    let pick = |kind: HardwareKind| -> Vec<Channel> {
        visible(board.assignments.channels(kind), settings.visible_range(kind))
            .into_iter()
            .cloned()
            .collect()
    };

    Ok(HttpResponse::Ok().json(BoardResponse {
        date: board.plan.as_ref().map(|p| p.date.clone()),
        title: board.plan.as_ref().map(|p| p.title.clone()),
        series: board.plan.as_ref().map(|p| p.series.clone()),
        status: board.status.clone(),
        last_updated: board.last_updated.to_rfc3339(),
        mics: pick(HardwareKind::Mic),
        monitors: pick(HardwareKind::Monitor),
    }))
}

// Manual refresh, may overlap a timer refresh
async fn post_refresh(state: web::Data<AppState>) -> Result<HttpResponse> {
    let outcome = state.coordinator.refresh().await;
    let board = state.coordinator.board();

    let body = match outcome {
        RefreshOutcome::Applied { generation } => serde_json::json!({
            "applied": true,
            "generation": generation,
            "status": board.status,
        }),
        RefreshOutcome::Stale { generation, latest } => serde_json::json!({
            "applied": false,
            "generation": generation,
            "latest": latest,
            "status": board.status,
        }),
    };
    Ok(HttpResponse::Ok().json(body))
}

async fn get_settings(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.coordinator.settings()))
}

// Saves settings; keys left out keep their default values
async fn put_settings(body: web::Json<Value>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let next = AppSettings::from_stored(body.into_inner());

    if let Err(err) = state.store.save(&next) {
        warn!(error = %err, "could not persist settings");
        return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to save settings: {}", err)
        })));
    }

    let refetch = state.coordinator.update_settings(next);
    info!(refetch, "settings updated");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "refetch": refetch })))
}

async fn get_service_types(state: web::Data<AppState>) -> Result<HttpResponse> {
    let settings = state.coordinator.settings();
    match state.coordinator.source().fetch_service_types(&settings).await {
        Ok(types) => Ok(HttpResponse::Ok().json(types)),
        Err(err) => {
            warn!(error = %err, "service types unavailable");
            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "success": false,
                "error": err.to_string()
            })))
        }
    }
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/dashboard.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/board", web::get().to(get_board))
        .route("/api/refresh", web::post().to(post_refresh))
        .route("/api/settings", web::get().to(get_settings))
        .route("/api/settings", web::put().to(put_settings))
        .route("/api/service-types", web::get().to(get_service_types));
}

pub async fn start_server(port: u16, coordinator: Arc<RefreshCoordinator>, store: SettingsStore) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { coordinator, store });

    info!(port, "starting dashboard server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
