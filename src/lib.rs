//! Stochastic customer-lifecycle and capacity simulation for a technician
//! service marketplace.
//!
//! A run advances day by day: demand is drawn, arrivals are spread over the
//! workday, technicians are booked, satisfaction and billing play out per
//! client, and weekly and monthly processes close the books.

pub mod arrival;
pub mod bench;
pub mod billing;
pub mod config;
pub mod demand;
pub mod dist;
pub mod engine;
pub mod metrics;
pub mod params;
pub mod periodic;
pub mod schedule;
pub mod state;
pub mod stats;

pub use config::Config;
pub use engine::Engine;
