//! cradle-lib: recipe model and lifecycle for the cargparse C library
//!
//! This crate provides the pieces the `cradle` binary drives:
//! - `Recipe`: package identity, option defaults, exported sources and packaging rules
//! - `ResolvedOptions`: the option set for one target, after platform rules apply
//! - `BuildConfiguration`: toolchain variables generated from the options
//! - `Pipeline`: the ordered lifecycle from option resolution to a committed package

pub mod config;
pub mod consts;
pub mod execute;
pub mod export;
pub mod layout;
pub mod options;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod recipe;
pub mod settings;
pub mod toolchain;
pub mod util;
