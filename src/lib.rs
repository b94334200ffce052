pub mod api;
pub mod block;
pub mod config;
pub mod database;
pub mod event;
pub mod logging;
pub mod market;
pub mod reactor;
pub mod stopper;
pub mod test_utils;
