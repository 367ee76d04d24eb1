//! Integration tests

pub mod concurrency_test;
pub mod http_test;
pub mod realtime_test;
