pub mod block;
pub mod course;
pub mod module;

pub use block::{ContentBlock, TEMP_ID_PREFIX};
pub use course::{Course, NewCourseRequest};
pub use module::{Difficulty, Module, SubModule};
