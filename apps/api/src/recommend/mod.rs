pub mod handlers;
pub mod samples;
