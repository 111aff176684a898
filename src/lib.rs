//! CreatorPay - Subscription platform for creators with eSewa payments
//!
//! This library provides the core functionality for the CreatorPay server:
//! database operations, payment intent creation, signed gateway callbacks,
//! subscription activation, and API handlers.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
