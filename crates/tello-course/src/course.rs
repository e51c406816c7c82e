use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{debug, info, info_span};

use tello_drone::{Actuator, Command};

/// What one tick does: at most one command, an optional forward jump of the
/// counter, and whether the course ends here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub command: Option<Command>,
    pub jump_to: Option<u32>,
    pub terminal: bool,
}

impl Step {
    pub const IDLE: Step = Step { command: None, jump_to: None, terminal: false };

    pub fn send(cmd: Command) -> Self {
        Step { command: Some(cmd), ..Step::IDLE }
    }

    /// Sends `cmd` and stops the course on the same tick.
    pub fn finish(cmd: Command) -> Self {
        Step { command: Some(cmd), jump_to: None, terminal: true }
    }

    pub fn jump_to(self, step: u32) -> Self {
        Step { jump_to: Some(step), ..self }
    }
}

/// Action table: `(current step, elapsed since start) -> Step`.
pub type ActionTable = fn(u32, Duration) -> Step;

/// Observable state of a course, as served to the status API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSnapshot {
    pub name: String,
    pub status: u32,
    pub is_running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Nanoseconds.
    #[serde(serialize_with = "as_nanos")]
    pub elapsed: Duration,
}

fn as_nanos<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_nanos().min(u64::MAX as u128) as u64)
}

#[derive(Debug, Default)]
struct RunState {
    status: u32,
    running: bool,
    start_time: Option<OffsetDateTime>,
    started: Option<Instant>,
    elapsed: Duration,
}

impl RunState {
    fn since_start(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Running -> Idle. Returns false if already idle.
    fn halt(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.status = 0;
        true
    }
}

/// One choreography instance. All state sits behind a per-course lock, so
/// concurrent `run` calls on the same course serialize while different
/// courses tick independently.
pub struct Course {
    name: String,
    table: ActionTable,
    drone: Arc<dyn Actuator>,
    state: Mutex<RunState>,
}

impl Course {
    pub fn new(name: impl Into<String>, table: ActionTable, drone: Arc<dyn Actuator>) -> Self {
        Self { name: name.into(), table, drone, state: Mutex::new(RunState::default()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Idle -> Running. A second start while running changes nothing.
    pub fn start(&self) {
        let mut st = self.lock();
        if st.running {
            return;
        }
        st.running = true;
        st.start_time = Some(OffsetDateTime::now_utc());
        st.started = Some(Instant::now());
        st.elapsed = Duration::ZERO;
        info!(course = %self.name, "course started");
    }

    /// Running -> Idle, resetting the step counter.
    pub fn stop(&self) {
        let mut st = self.lock();
        if st.halt() {
            info!(course = %self.name, "course stopped");
        }
    }

    /// One tick. A no-op while idle; otherwise advances the counter,
    /// dispatches the step's command and stops on a terminal step.
    pub fn run(&self) -> CourseSnapshot {
        let mut st = self.lock();
        if !st.running {
            return self.snapshot_of(&st);
        }

        st.status += 1;
        let step = (self.table)(st.status, st.since_start());

        if let Some(cmd) = step.command {
            let _span = info_span!("course", course = %self.name, status = st.status).entered();
            debug!(command = %cmd, "course step");
            self.drone.execute(cmd);
        }
        if let Some(target) = step.jump_to {
            if target > st.status {
                debug!(course = %self.name, from = st.status, to = target, "course branch");
                st.status = target;
            }
        }

        if step.terminal {
            st.halt();
            info!(course = %self.name, "course finished");
        } else {
            st.elapsed = st.since_start();
        }
        self.snapshot_of(&st)
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        let st = self.lock();
        self.snapshot_of(&st)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    fn snapshot_of(&self, st: &RunState) -> CourseSnapshot {
        CourseSnapshot {
            name: self.name.clone(),
            status: st.status,
            is_running: st.running,
            start_time: st.start_time,
            elapsed: st.elapsed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Course").field("name", &self.name).field("state", &*self.lock()).finish()
    }
}
