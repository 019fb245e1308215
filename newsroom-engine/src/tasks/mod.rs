pub mod handlers;
pub mod worker;

pub use worker::Worker;
