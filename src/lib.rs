//! Ledgerly - Invoicing SaaS Backend
//!
//! This crate implements the subscription billing lifecycle for the Ledgerly
//! invoicing platform: payment gateway integration, plan upgrades driven by
//! browser callbacks and server-to-server webhooks, and the scheduled
//! subscription expiry sweep.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
