// Core domain for the Vitali wellness tracker: data model, calorie estimation,
// aggregates, the in-memory tracker, the local store, and configuration.

pub mod activity;
pub mod config;
pub mod model;
pub mod stats;
pub mod store;
pub mod tracker;
