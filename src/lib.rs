pub mod app;
pub mod cli;
pub mod commands;
pub mod grid;
pub mod model;
pub mod storage;
pub mod streak;
pub mod ui;
