#![doc = "fido-sync-core: core logic library for fido-sync."]

//! This crate holds the Dog Record model, the store and producer contracts,
//! the concrete rescue producers, and the reconciliation engine that keeps the
//! Current/Archive/Logs store in step with what the rescues list.
//!
//! # Usage
//! Build producers from [`producers::ProducerConfig`], collect a batch with
//! [`aggregate::aggregate`], then pass it to [`synchronise::synchronise`]
//! together with a [`contract::DogStore`] implementation.

pub mod aggregate;
pub mod config;
pub mod contract;
pub mod normalize;
pub mod producers;
pub mod record;
pub mod synchronise;
