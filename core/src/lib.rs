//! Simulation and analytics core for a regional import-tax revenue
//! dashboard: sector reference data, a synthetic historical series,
//! a live-updating current snapshot, aggregations, a tax calculator
//! and revenue projections.

pub mod aggregation;
pub mod calculator;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod indicators;
pub mod live_subsystem;
pub mod product;
pub mod projection;
pub mod rng;
pub mod sector;
pub mod snapshot;
pub mod store;
pub mod types;
