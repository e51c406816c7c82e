pub mod api;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{web, App, HttpServer};
use tokio::signal;
use tracing::info;

use tello_course::CourseRegistry;
use tello_drone::DroneManager;

/// Everything the request handlers need, built once in `main`.
pub struct AppContext {
    pub drone: Arc<DroneManager>,
    pub courses: CourseRegistry,
}

impl AppContext {
    pub fn new(drone: Arc<DroneManager>) -> Self {
        let courses = CourseRegistry::defaults(drone.clone());
        Self { drone, courses }
    }
}

/// Serves the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, ctx: Arc<AppContext>) -> Result<()> {
    let server = build_server(addr, ctx)?;
    let handle = server.handle();
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        info!("http: shutting down");
        handle.stop(true).await;
    });
    info!("http: listening on {}", addr);
    server.await.context("http server")?;
    Ok(())
}

fn build_server(addr: SocketAddr, ctx: Arc<AppContext>) -> Result<Server> {
    let data = web::Data::from(ctx);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .configure(api::configure)
    })
    .shutdown_timeout(1)
    .disable_signals()
    .bind(addr)
    .with_context(|| format!("bind {}", addr))?
    .run();
    Ok(server)
}
