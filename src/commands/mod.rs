pub mod analyze;
pub mod cache;
pub mod fill;
pub mod resolve;
pub mod suggest;
pub mod utils;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
