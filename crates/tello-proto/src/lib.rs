pub mod api;
pub mod manual;

pub use api::{ApiError, ApiResult};
pub use manual::{parse_course_id, parse_speed, ManualCommand};
