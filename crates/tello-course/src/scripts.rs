//! Built-in choreographies.

use std::time::Duration;

use tello_drone::{Command, Flip};

use crate::course::Step;

/// Yaw rate used by the rotation steps.
pub const ROTATION_SPEED: i32 = 30;

/// Course B skips its rotation leg when step 20 is reached this quickly.
pub const BRANCH_WINDOW: Duration = Duration::from_secs(10);

pub const COURSE_A: &str = "Course A";
pub const COURSE_B: &str = "Course B";

pub fn course_a(step: u32, _elapsed: Duration) -> Step {
    match step {
        1 => Step::send(Command::TakeOff),
        10 | 20 => Step::send(Command::Clockwise(ROTATION_SPEED)),
        15 | 25 => Step::send(Command::CounterClockwise(ROTATION_SPEED)),
        30 => Step::send(Command::Hover),
        35 => Step::send(Command::Flip(Flip::Front)),
        45 => Step::send(Command::Flip(Flip::Back)),
        55 => Step::finish(Command::Land),
        _ => Step::IDLE,
    }
}

pub fn course_b(step: u32, elapsed: Duration) -> Step {
    match step {
        1 => Step::send(Command::TakeOff),
        10 => Step::send(Command::Flip(Flip::Front)),
        20 => {
            let flip = Step::send(Command::Flip(Flip::Front));
            if elapsed < BRANCH_WINDOW { flip.jump_to(35) } else { flip }
        }
        30 => Step::send(Command::Clockwise(ROTATION_SPEED)),
        40 => Step::send(Command::Hover),
        50 => Step::finish(Command::Land),
        _ => Step::IDLE,
    }
}
