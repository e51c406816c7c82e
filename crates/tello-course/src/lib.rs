//! Tick-driven choreography engine.
//!
//! A [`Course`] advances one step per [`Course::run`] call while running and
//! maps each step to at most one drone command through its action table.
//! Nothing here schedules ticks; callers do.

pub mod course;
pub mod registry;
pub mod scripts;

#[cfg(test)]
pub(crate) mod testing;

pub use course::{ActionTable, Course, CourseSnapshot, Step};
pub use registry::CourseRegistry;
