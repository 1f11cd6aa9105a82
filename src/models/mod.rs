pub mod classes;
pub mod common;
pub mod exams;
pub mod results;
pub mod students;
pub mod uploads;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;
