pub mod cache;
pub mod common;
pub mod config;
pub mod database;
pub mod domain;
pub mod services;
pub mod storage;
pub mod tasks;

pub use common::error::{NewsroomError, Result};
pub use config::Settings;
pub use database::DatabaseManager;
pub use domain::*;
