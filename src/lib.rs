// Library for tests to access modules

pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod reaction;
pub mod runner;
pub mod stats_repo;
