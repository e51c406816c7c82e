use std::collections::BTreeMap;
use std::sync::Arc;

use tello_drone::Actuator;

use crate::course::Course;
use crate::scripts;

/// Fixed id -> course table. Built once at startup; there is no way to add
/// or remove courses afterwards, so shared reads need no locking.
#[derive(Debug)]
pub struct CourseRegistry {
    courses: BTreeMap<u32, Course>,
}

impl CourseRegistry {
    /// The stock courses: 1 = Course A, 2 = Course B.
    pub fn defaults(drone: Arc<dyn Actuator>) -> Self {
        Self::from_courses([
            (1, Course::new(scripts::COURSE_A, scripts::course_a, drone.clone())),
            (2, Course::new(scripts::COURSE_B, scripts::course_b, drone)),
        ])
    }

    pub fn from_courses(courses: impl IntoIterator<Item = (u32, Course)>) -> Self {
        Self { courses: courses.into_iter().collect() }
    }

    pub fn get(&self, id: u32) -> Option<&Course> {
        self.courses.get(&id)
    }

    /// Courses in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Course)> {
        self.courses.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
