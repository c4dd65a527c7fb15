//! Core types and definitions for the BULWARK simulation.
//!
//! This crate defines the vocabulary shared by the simulation and its
//! collaborators: tile and rect geometry, motion primitives, input frames,
//! outbound events, render snapshots, constants, and the datapack feed.
//! It has no dependency on any renderer or windowing framework.

pub mod commands;
pub mod constants;
pub mod datapack;
pub mod enums;
pub mod events;
pub mod motion;
pub mod smooth;
pub mod state;
pub mod types;
