pub mod account;
pub mod course;
pub mod enums;
pub mod graph;
pub mod student;
pub mod study_stats;
pub mod task;

pub use account::*;
pub use course::*;
pub use graph::*;
pub use student::*;
pub use study_stats::*;
pub use task::*;
