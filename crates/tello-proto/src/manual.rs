use std::str::FromStr;

use crate::api::ApiError;

/// Operator commands accepted by the command endpoint, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualCommand {
    CeaseRotation,
    TakeOff,
    Land,
    Hover,
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
    Clockwise,
    CounterClockwise,
    Speed,
    FrontFlip,
    BackFlip,
    LeftFlip,
    RightFlip,
    ThrowTakeOff,
    Bounce,
    Patrol,
    StopPatrol,
    FaceDetectTrack,
    StopFaceDetectTrack,
    Snapshot,
}

impl ManualCommand {
    pub const ALL: [ManualCommand; 24] = [
        ManualCommand::CeaseRotation,
        ManualCommand::TakeOff,
        ManualCommand::Land,
        ManualCommand::Hover,
        ManualCommand::Up,
        ManualCommand::Down,
        ManualCommand::Left,
        ManualCommand::Right,
        ManualCommand::Forward,
        ManualCommand::Backward,
        ManualCommand::Clockwise,
        ManualCommand::CounterClockwise,
        ManualCommand::Speed,
        ManualCommand::FrontFlip,
        ManualCommand::BackFlip,
        ManualCommand::LeftFlip,
        ManualCommand::RightFlip,
        ManualCommand::ThrowTakeOff,
        ManualCommand::Bounce,
        ManualCommand::Patrol,
        ManualCommand::StopPatrol,
        ManualCommand::FaceDetectTrack,
        ManualCommand::StopFaceDetectTrack,
        ManualCommand::Snapshot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ManualCommand::CeaseRotation => "ceaseRotation",
            ManualCommand::TakeOff => "takeOff",
            ManualCommand::Land => "land",
            ManualCommand::Hover => "hover",
            ManualCommand::Up => "up",
            ManualCommand::Down => "down",
            ManualCommand::Left => "left",
            ManualCommand::Right => "right",
            ManualCommand::Forward => "forward",
            ManualCommand::Backward => "backward",
            ManualCommand::Clockwise => "clockwise",
            ManualCommand::CounterClockwise => "counterClockwise",
            ManualCommand::Speed => "speed",
            ManualCommand::FrontFlip => "frontFlip",
            ManualCommand::BackFlip => "backFlip",
            ManualCommand::LeftFlip => "leftFlip",
            ManualCommand::RightFlip => "rightFlip",
            ManualCommand::ThrowTakeOff => "throwTakeOff",
            ManualCommand::Bounce => "bounce",
            ManualCommand::Patrol => "patrol",
            ManualCommand::StopPatrol => "stopPatrol",
            ManualCommand::FaceDetectTrack => "faceDetectTrack",
            ManualCommand::StopFaceDetectTrack => "stopFaceDetectTrack",
            ManualCommand::Snapshot => "snapshot",
        }
    }
}

impl FromStr for ManualCommand {
    type Err = ApiError;

    // Names are case-sensitive, as the browser controller sends them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManualCommand::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or(ApiError::NotFound)
    }
}

/// Speed from a request value; missing or non-integer input yields `default`.
/// Surrounding whitespace makes the value non-integer.
pub fn parse_speed(raw: Option<&str>, default: i32) -> i32 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

pub fn parse_course_id(raw: Option<&str>) -> Result<u32, ApiError> {
    let raw = raw.unwrap_or_default();
    raw.trim()
        .parse()
        .map_err(|e| ApiError::InvalidInput(format!("invalid course id {:?}: {}", raw, e)))
}
