pub mod artifact;
pub mod handlers;
pub mod ingest;
pub mod publisher;
pub mod service;
pub mod storage;
