use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use tello_drone::{Actuator, Command, DEFAULT_SPEED};

/// Actuator that only remembers what it was told.
pub struct Recorder {
    log: Mutex<Vec<Command>>,
    speed: AtomicI32,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { log: Mutex::new(Vec::new()), speed: AtomicI32::new(DEFAULT_SPEED) })
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().clone()
    }
}

impl Actuator for Recorder {
    fn execute(&self, cmd: Command) {
        self.log.lock().unwrap().push(cmd);
    }

    fn speed(&self) -> i32 {
        self.speed.load(Ordering::Relaxed)
    }

    fn set_speed(&self, speed: i32) {
        self.speed.store(speed, Ordering::Relaxed);
    }
}
