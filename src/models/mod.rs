pub mod event;
pub mod job;
pub mod submission;
pub mod summary;
pub mod video;
