pub mod command;
pub mod doctor;
pub mod manager;
pub mod probe;
pub mod safety;
pub mod sdk;
pub mod state;

use serde::Deserialize;

pub use command::{Command, Flip, Sticks};
pub use manager::DroneManager;

/// Speed used for stick commands when the operator never set one.
pub const DEFAULT_SPEED: i32 = 10;

pub const DEFAULT_DRONE_ADDR: &str = "192.168.10.1:8889";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8889";

#[derive(Debug, Clone, Deserialize)]
pub struct DroneConfig {
    /// When false the manager runs without a link and only logs commands.
    pub enable: bool,

    /// Drone SDK endpoint. Tello in AP mode answers on 192.168.10.1:8889.
    pub addr: Option<String>,

    /// Local UDP address for commands and replies.
    pub bind: Option<String>,

    /// Probe candidates; defaults to `addr` alone.
    pub candidate_addrs: Option<Vec<String>>,

    pub handshake_timeout_ms: Option<u64>,

    /// Refuse to serve unless the drone answered `command` with `ok`.
    #[serde(default)]
    pub require_handshake: bool,

    pub default_speed: Option<i32>,

    /// Minimum spacing between take-offs and between flips. 0 disables.
    pub command_min_interval_ms: Option<u64>,
}

impl DroneConfig {
    pub fn addr(&self) -> String {
        self.addr.clone().unwrap_or_else(|| DEFAULT_DRONE_ADDR.into())
    }

    pub fn bind(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
    }

    pub fn candidates(&self) -> Vec<String> {
        self.candidate_addrs.clone().unwrap_or_else(|| vec![self.addr()])
    }
}

/// The drone command surface. Every call is fire-and-forget: nothing is
/// returned and nothing waits for the drone to confirm.
pub trait Actuator: Send + Sync {
    fn execute(&self, cmd: Command);
    fn speed(&self) -> i32;
    fn set_speed(&self, speed: i32);

    fn take_off(&self) { self.execute(Command::TakeOff) }
    fn throw_take_off(&self) { self.execute(Command::ThrowTakeOff) }
    fn land(&self) { self.execute(Command::Land) }
    fn hover(&self) { self.execute(Command::Hover) }
    fn cease_rotation(&self) { self.execute(Command::CeaseRotation) }

    fn up(&self, speed: i32) { self.execute(Command::Up(speed)) }
    fn down(&self, speed: i32) { self.execute(Command::Down(speed)) }
    fn left(&self, speed: i32) { self.execute(Command::Left(speed)) }
    fn right(&self, speed: i32) { self.execute(Command::Right(speed)) }
    fn forward(&self, speed: i32) { self.execute(Command::Forward(speed)) }
    fn backward(&self, speed: i32) { self.execute(Command::Backward(speed)) }
    fn clockwise(&self, speed: i32) { self.execute(Command::Clockwise(speed)) }
    fn counter_clockwise(&self, speed: i32) { self.execute(Command::CounterClockwise(speed)) }

    fn front_flip(&self) { self.execute(Command::Flip(Flip::Front)) }
    fn back_flip(&self) { self.execute(Command::Flip(Flip::Back)) }
    fn left_flip(&self) { self.execute(Command::Flip(Flip::Left)) }
    fn right_flip(&self) { self.execute(Command::Flip(Flip::Right)) }

    fn bounce(&self) { self.execute(Command::Bounce) }
    fn start_patrol(&self) { self.execute(Command::StartPatrol) }
    fn stop_patrol(&self) { self.execute(Command::StopPatrol) }
    fn enable_face_detect_tracking(&self) { self.execute(Command::EnableFaceDetectTracking) }
    fn disable_face_detect_tracking(&self) { self.execute(Command::DisableFaceDetectTracking) }
    fn take_snapshot(&self) { self.execute(Command::TakeSnapshot) }
}
