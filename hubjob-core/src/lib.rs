//! Hubjob Core
//!
//! Core types shared by the hubjob client, tracker and CLI.
//!
//! This crate contains:
//! - Domain types: jobs, job status, device observations
//! - DTOs: request bodies and query parameters sent to the hub

pub mod domain;
pub mod dto;
