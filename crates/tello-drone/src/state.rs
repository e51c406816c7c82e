use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DroneStatus {
    pub connected: bool,
    pub addr: Option<String>,
    pub speed: i32,
    pub last_command: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_command_at: Option<OffsetDateTime>,
    pub commands_sent: u64,
    pub patrolling: bool,
    pub bouncing: bool,
    pub face_tracking: bool,
    pub snapshots: u64,
}

impl DroneStatus {
    pub fn last_command_age(&self) -> Option<time::Duration> {
        self.last_command_at.map(|t| OffsetDateTime::now_utc() - t)
    }
}
