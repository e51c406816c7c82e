use anyhow::{Context, Result};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::command::{Command, Sticks};
use crate::safety::CommandRateLimit;
use crate::sdk::TelloLink;
use crate::state::DroneStatus;
use crate::{Actuator, DroneConfig, DEFAULT_SPEED};

const PATROL_STEP: Duration = Duration::from_secs(3);
const BOUNCE_STEP: Duration = Duration::from_secs(1);
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Process-wide drone handle. Turns actuator calls into SDK lines and owns
/// the background patrol/bounce loops.
pub struct DroneManager {
    shared: Arc<Shared>,
    default_speed: i32,
    tasks: Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    patrol: Option<JoinHandle<()>>,
    bounce: Option<JoinHandle<()>>,
}

struct Shared {
    link: Option<TelloLink>,
    speed: AtomicI32,
    inner: Mutex<Inner>,
}

struct Inner {
    sticks: Sticks,
    limiter: CommandRateLimit,
    status: DroneStatus,
}

impl DroneManager {
    /// Opens the SDK link described by `cfg` (or a dry-run manager when
    /// `cfg.enable` is false) and puts the drone into SDK mode.
    pub fn connect(cfg: &DroneConfig) -> Result<Self> {
        let speed = cfg.default_speed.unwrap_or(DEFAULT_SPEED);
        let min_interval = cfg
            .command_min_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MIN_INTERVAL);

        if !cfg.enable {
            info!("drone: link disabled, running dry");
            return Ok(Self::dry_run(speed, min_interval));
        }

        let link = TelloLink::open(&cfg.bind(), &cfg.addr()).context("drone link open")?;
        link.enter_sdk_mode().context("enter sdk mode")?;

        let timeout = Duration::from_millis(cfg.handshake_timeout_ms.unwrap_or(3000));
        let connected = match link.wait_reply(timeout) {
            Ok(Some(reply)) if reply.eq_ignore_ascii_case("ok") => true,
            Ok(other) => {
                warn!("drone: sdk handshake got {:?}", other);
                false
            }
            Err(e) => {
                warn!("drone: sdk handshake failed: {:#}", e);
                false
            }
        };
        if cfg.require_handshake && !connected {
            anyhow::bail!("drone at {} did not answer the sdk handshake", link.drone_addr());
        }
        info!("drone: link up addr={} handshake={}", link.drone_addr(), connected);

        let mgr = Self::with_link(Some(link), speed, min_interval);
        mgr.shared.lock().status.connected = connected;
        Ok(mgr)
    }

    pub fn dry_run(speed: i32, min_interval: Duration) -> Self {
        Self::with_link(None, speed, min_interval)
    }

    fn with_link(link: Option<TelloLink>, speed: i32, min_interval: Duration) -> Self {
        let status = DroneStatus {
            addr: link.as_ref().map(|l| l.drone_addr().to_string()),
            ..DroneStatus::default()
        };
        Self {
            shared: Arc::new(Shared {
                link,
                speed: AtomicI32::new(speed),
                inner: Mutex::new(Inner {
                    sticks: Sticks::default(),
                    limiter: CommandRateLimit::new(min_interval),
                    status,
                }),
            }),
            tasks: Mutex::new(Tasks::default()),
            default_speed: speed,
        }
    }

    /// Configured speed, used when an operator sends an unusable speed.
    pub fn default_speed(&self) -> i32 {
        self.default_speed
    }

    pub fn status(&self) -> DroneStatus {
        let mut st = self.shared.lock().status.clone();
        st.speed = self.shared.speed();
        st
    }

    fn spawn_patrol(&self) {
        let mut tasks = lock(&self.tasks);
        if tasks.patrol.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let Ok(rt) = Handle::try_current() else {
            warn!("drone: patrol needs a tokio runtime, ignoring");
            return;
        };
        let shared = self.shared.clone();
        tasks.patrol = Some(rt.spawn(async move {
            let mut tick = tokio::time::interval(PATROL_STEP);
            for step in (0..PATROL_PATTERN_LEN).cycle() {
                tick.tick().await;
                shared.fly(patrol_command(step, shared.speed()));
            }
        }));
        self.shared.lock().status.patrolling = true;
        info!("drone: patrol started");
    }

    fn cancel_patrol(&self) {
        let handle = lock(&self.tasks).patrol.take();
        if let Some(h) = handle {
            h.abort();
            self.shared.lock().status.patrolling = false;
            self.shared.fly(Command::Hover);
            info!("drone: patrol stopped");
        }
    }

    fn toggle_bounce(&self) {
        let mut tasks = lock(&self.tasks);
        if let Some(h) = tasks.bounce.take() {
            h.abort();
            self.shared.lock().status.bouncing = false;
            self.shared.fly(Command::Hover);
            info!("drone: bounce off");
            return;
        }
        let Ok(rt) = Handle::try_current() else {
            warn!("drone: bounce needs a tokio runtime, ignoring");
            return;
        };
        let shared = self.shared.clone();
        tasks.bounce = Some(rt.spawn(async move {
            let mut tick = tokio::time::interval(BOUNCE_STEP);
            let mut rising = true;
            loop {
                tick.tick().await;
                let speed = shared.speed();
                shared.fly(if rising { Command::Up(speed) } else { Command::Down(speed) });
                rising = !rising;
            }
        }));
        self.shared.lock().status.bouncing = true;
        info!("drone: bounce on");
    }
}

impl Actuator for DroneManager {
    fn execute(&self, cmd: Command) {
        match cmd {
            Command::StartPatrol => self.spawn_patrol(),
            Command::StopPatrol => self.cancel_patrol(),
            Command::Bounce => self.toggle_bounce(),
            Command::EnableFaceDetectTracking | Command::DisableFaceDetectTracking => {
                let on = cmd == Command::EnableFaceDetectTracking;
                self.shared.lock().status.face_tracking = on;
                info!("drone: face tracking {}", if on { "enabled" } else { "disabled" });
            }
            Command::TakeSnapshot => {
                let mut inner = self.shared.lock();
                inner.status.snapshots += 1;
                info!("drone: snapshot #{}", inner.status.snapshots);
            }
            other => self.shared.fly(other),
        }
    }

    fn speed(&self) -> i32 {
        self.shared.speed()
    }

    fn set_speed(&self, speed: i32) {
        self.shared.speed.store(speed, Ordering::Relaxed);
        info!("drone: speed={}", speed);
    }
}

impl Drop for DroneManager {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for h in [tasks.patrol.take(), tasks.bounce.take()].into_iter().flatten() {
            h.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    fn speed(&self) -> i32 {
        self.speed.load(Ordering::Relaxed)
    }

    /// Sends one flight command. Stick commands become a full `rc` line.
    fn fly(&self, cmd: Command) {
        let mut inner = self.lock();
        let line = if cmd.is_stick() {
            inner.sticks.apply(cmd);
            inner.sticks.rc_line()
        } else {
            match cmd {
                Command::TakeOff | Command::ThrowTakeOff if !inner.limiter.allow_takeoff() => {
                    warn!(command = %cmd, "drone: take-off rate-limited");
                    return;
                }
                Command::Flip(_) if !inner.limiter.allow_flip() => {
                    warn!(command = %cmd, "drone: flip rate-limited");
                    return;
                }
                Command::ThrowTakeOff => {
                    warn!("drone: throw take-off not available over sdk, sending takeoff");
                }
                _ => {}
            }
            match cmd.sdk_line() {
                Some(line) => line,
                None => return,
            }
        };

        if let Some(link) = &self.link {
            if let Err(e) = link.send_line(&line) {
                warn!(command = %cmd, "drone: send failed: {:#}", e);
                return;
            }
        }
        info!(command = %cmd, line = %line, "drone: command");
        inner.status.last_command = Some(line);
        inner.status.last_command_at = Some(OffsetDateTime::now_utc());
        inner.status.commands_sent += 1;
    }
}

const PATROL_PATTERN_LEN: usize = 6;

fn patrol_command(step: usize, speed: i32) -> Command {
    match step % PATROL_PATTERN_LEN {
        0 => Command::Forward(speed),
        1 => Command::Right(speed),
        2 => Command::Backward(speed),
        3 => Command::Left(speed),
        4 => Command::Clockwise(speed),
        _ => Command::Hover,
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
