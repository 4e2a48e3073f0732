//! Unit tests for individual components

mod builders_test;
mod config_test;
mod error_test;
mod failure_test;
mod util_test;
mod work_queue_test;
