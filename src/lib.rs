//! Transaction Orchestration Library
//!
//! This library turns transaction requests into schedules of jobs and drives
//! those jobs through their lifecycle. It includes:
//!
//! - Idempotent transaction requests, replayed per tenant and idempotency key
//! - Public, raw, EEA and GoQuorum private transaction pipelines
//! - Job state transitions, re-dispatch and gas-bumped retries
//! - Faucet pre-funding of sender accounts
//! - In-memory trackers of pending jobs and retry sessions
//!
//! # Module Structure
//!
//! - `bootstrap`: Start-up wiring of state, configuration and trackers
//! - `config`: Configuration management
//! - `domain`: Job lifecycle manager and transaction request orchestrator
//! - `jobs`: Queue messages and their producer
//! - `logging`: Logging setup
//! - `models`: Data structures for requests, jobs and chains
//! - `repositories`: Storage of schedules, jobs, requests, chains and faucets
//! - `services`: Notifications, faucet selection and trackers
//! - `utils`: Common utilities and helper functions

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod domain;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
