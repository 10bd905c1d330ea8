//! HTTP request handlers

pub mod health;
pub mod sensors;
pub mod stations;
