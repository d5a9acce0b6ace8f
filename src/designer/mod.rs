pub mod error;
pub mod retry;
pub mod run_test;
pub mod title;
