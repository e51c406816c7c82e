use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use tello_course::Course;
use tello_drone::doctor as drone_doctor;
use tello_drone::probe::probe_drone;
use tello_drone::{Actuator, DroneConfig, DroneManager};
use tello_web::AppContext;

#[derive(Debug, Parser)]
#[command(name = "tello", version, about = "Tello remote control and course server")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP control API.
    Serve,
    /// Validate the config file.
    Doctor,
    /// Look for a drone answering the SDK handshake.
    Probe,
    /// Fly one course locally, ticking it at a fixed rate until it ends.
    Fly {
        #[arg(long)]
        course: u32,
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,
    },
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    #[serde(default)]
    web: WebCfg,
    drone: DroneConfig,
    log: Option<LogCfg>,
}

#[derive(Debug, serde::Deserialize)]
struct WebCfg {
    address: String,
    port: u16,
}

impl Default for WebCfg {
    fn default() -> Self {
        Self { address: "0.0.0.0".into(), port: 8080 }
    }
}

impl WebCfg {
    fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.address, self.port)
            .parse()
            .with_context(|| format!("web.address {:?} is not an ip address", self.address))
    }
}

#[derive(Debug, serde::Deserialize)]
struct LogCfg {
    file: Option<String>,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    parse_config(&s)
}

fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config toml")
}

/// stdout always; the configured log file too, if any.
fn init_logging(log: Option<&LogCfg>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log.and_then(|l| l.file.as_deref()) {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    init_logging(cfg.log.as_ref())?;

    match cli.cmd {
        Command::Serve => serve(&cfg).await?,
        Command::Doctor => doctor(&cfg)?,
        Command::Probe => probe(&cfg)?,
        Command::Fly { course, tick_ms } => fly(&cfg, course, tick_ms).await?,
    }
    Ok(())
}

async fn serve(cfg: &Config) -> Result<()> {
    let addr = cfg.web.socket_addr()?;
    let drone = Arc::new(DroneManager::connect(&cfg.drone).context("drone")?);
    let ctx = Arc::new(AppContext::new(drone));
    info!("serve: {} courses loaded", ctx.courses.len());
    tello_web::serve(addr, ctx).await
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");
    cfg.web.socket_addr()?;
    anyhow::ensure!(cfg.web.port > 0, "web.port must be set");
    drone_doctor::check_drone_config(&cfg.drone)?;
    if let Some(path) = cfg.log.as_ref().and_then(|l| l.file.as_deref()) {
        anyhow::ensure!(!path.trim().is_empty(), "log.file is empty");
    }
    info!("doctor: OK");
    Ok(())
}

fn probe(cfg: &Config) -> Result<()> {
    let timeout = Duration::from_millis(cfg.drone.handshake_timeout_ms.unwrap_or(3000));
    let res = probe_drone(cfg.drone.candidates(), &cfg.drone.bind(), timeout)?;
    match &res.chosen {
        Some(addr) => println!("CHOSEN: {}", addr),
        None => println!("CHOSEN: none"),
    }
    for p in res.probes {
        println!("probe addr={} ok={} {}ms note={}", p.addr, p.ok_seen, p.elapsed_ms, p.note);
    }
    Ok(())
}

async fn fly(cfg: &Config, course_id: u32, tick_ms: u64) -> Result<()> {
    let drone = Arc::new(DroneManager::connect(&cfg.drone).context("drone")?);
    let ctx = AppContext::new(drone);
    let course = ctx
        .courses
        .get(course_id)
        .with_context(|| format!("no course with id {}", course_id))?;

    let ticks = fly_course(course, ctx.drone.as_ref(), Duration::from_millis(tick_ms.max(1))).await;

    let st = ctx.drone.status();
    info!(
        "fly: {} done after {} ticks, {} commands sent, last={:?} ({:?} ago)",
        course.name(),
        ticks,
        st.commands_sent,
        st.last_command,
        st.last_command_age(),
    );
    Ok(())
}

/// Drives `course` from start to its terminal step. Ctrl-C stops the course
/// and lands.
async fn fly_course(course: &Course, drone: &dyn Actuator, tick: Duration) -> u32 {
    course.start();
    let mut interval = tokio::time::interval(tick);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut ticks = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                warn!("fly: interrupted at tick {}, landing", ticks);
                course.stop();
                drone.land();
                return ticks;
            }
        }
        ticks += 1;
        let snap = course.run();
        info!(course = %snap.name, status = snap.status, elapsed_ms = snap.elapsed.as_millis() as u64, "fly: tick");
        if !snap.is_running {
            return ticks;
        }
    }
}
