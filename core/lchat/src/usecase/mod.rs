//! ユースケース層

pub mod app;
pub mod locate_model;
pub mod session;
