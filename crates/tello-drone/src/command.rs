use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Front,
    Back,
    Left,
    Right,
}

impl Flip {
    fn sdk_dir(self) -> char {
        match self {
            Flip::Front => 'f',
            Flip::Back => 'b',
            Flip::Left => 'l',
            Flip::Right => 'r',
        }
    }
}

/// One actuator primitive. Speed-carrying variants hold a stick magnitude
/// in percent (clamped to 0..=100 when sent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TakeOff,
    ThrowTakeOff,
    Land,
    Hover,
    CeaseRotation,
    Up(i32),
    Down(i32),
    Left(i32),
    Right(i32),
    Forward(i32),
    Backward(i32),
    Clockwise(i32),
    CounterClockwise(i32),
    Flip(Flip),
    Bounce,
    StartPatrol,
    StopPatrol,
    EnableFaceDetectTracking,
    DisableFaceDetectTracking,
    TakeSnapshot,
}

impl Command {
    /// True for commands that only change the stick state.
    pub fn is_stick(&self) -> bool {
        matches!(
            self,
            Command::Hover
                | Command::CeaseRotation
                | Command::Up(_)
                | Command::Down(_)
                | Command::Left(_)
                | Command::Right(_)
                | Command::Forward(_)
                | Command::Backward(_)
                | Command::Clockwise(_)
                | Command::CounterClockwise(_)
        )
    }

    /// SDK line for discrete commands. Stick commands go through [`Sticks`]
    /// and local-only commands (patrol, bounce, vision) have no line.
    pub fn sdk_line(&self) -> Option<String> {
        match self {
            Command::TakeOff | Command::ThrowTakeOff => Some("takeoff".into()),
            Command::Land => Some("land".into()),
            Command::Flip(dir) => Some(format!("flip {}", dir.sdk_dir())),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Up(s) => write!(f, "up({s})"),
            Command::Down(s) => write!(f, "down({s})"),
            Command::Left(s) => write!(f, "left({s})"),
            Command::Right(s) => write!(f, "right({s})"),
            Command::Forward(s) => write!(f, "forward({s})"),
            Command::Backward(s) => write!(f, "backward({s})"),
            Command::Clockwise(s) => write!(f, "clockwise({s})"),
            Command::CounterClockwise(s) => write!(f, "counter_clockwise({s})"),
            Command::Flip(dir) => write!(f, "flip({dir:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Virtual stick positions, in percent: lateral, longitudinal, vertical, yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sticks {
    pub lr: i32,
    pub fb: i32,
    pub ud: i32,
    pub yaw: i32,
}

impl Sticks {
    /// Folds a stick command into the current state. Returns false for
    /// commands that don't touch the sticks.
    pub fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Hover => *self = Sticks::default(),
            Command::CeaseRotation => self.yaw = 0,
            Command::Up(s) => self.ud = clamp(s),
            Command::Down(s) => self.ud = -clamp(s),
            Command::Right(s) => self.lr = clamp(s),
            Command::Left(s) => self.lr = -clamp(s),
            Command::Forward(s) => self.fb = clamp(s),
            Command::Backward(s) => self.fb = -clamp(s),
            Command::Clockwise(s) => self.yaw = clamp(s),
            Command::CounterClockwise(s) => self.yaw = -clamp(s),
            _ => return false,
        }
        true
    }

    pub fn rc_line(&self) -> String {
        format!("rc {} {} {} {}", self.lr, self.fb, self.ud, self.yaw)
    }
}

fn clamp(speed: i32) -> i32 {
    speed.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_commands_map_to_sdk_lines() {
        assert_eq!(Command::TakeOff.sdk_line().as_deref(), Some("takeoff"));
        assert_eq!(Command::ThrowTakeOff.sdk_line().as_deref(), Some("takeoff"));
        assert_eq!(Command::Land.sdk_line().as_deref(), Some("land"));
        assert_eq!(Command::Flip(Flip::Back).sdk_line().as_deref(), Some("flip b"));
        assert_eq!(Command::Flip(Flip::Left).sdk_line().as_deref(), Some("flip l"));
        assert_eq!(Command::Hover.sdk_line(), None);
        assert_eq!(Command::StartPatrol.sdk_line(), None);
    }

    #[test]
    fn sticks_accumulate_until_hover() {
        let mut s = Sticks::default();
        assert!(s.apply(Command::Forward(40)));
        assert!(s.apply(Command::Clockwise(30)));
        assert!(s.apply(Command::Down(20)));
        assert_eq!(s.rc_line(), "rc 0 40 -20 30");

        s.apply(Command::CeaseRotation);
        assert_eq!(s.rc_line(), "rc 0 40 -20 0");

        s.apply(Command::Hover);
        assert_eq!(s, Sticks::default());
    }

    #[test]
    fn stick_speed_is_clamped() {
        let mut s = Sticks::default();
        s.apply(Command::CounterClockwise(250));
        s.apply(Command::Left(-5));
        assert_eq!(s.yaw, -100);
        assert_eq!(s.lr, 0);
    }

    #[test]
    fn non_stick_commands_leave_sticks_alone() {
        let mut s = Sticks { lr: 1, fb: 2, ud: 3, yaw: 4 };
        assert!(!s.apply(Command::TakeOff));
        assert!(!s.apply(Command::Flip(Flip::Front)));
        assert_eq!(s.rc_line(), "rc 1 2 3 4");
        assert!(!Command::TakeSnapshot.is_stick());
        assert!(Command::Hover.is_stick());
    }
}
