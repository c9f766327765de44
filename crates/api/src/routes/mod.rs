//! API route modules

pub mod calendar;
pub mod health;
