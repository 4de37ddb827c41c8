// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Quick Navigation
//!
//! - **Entry point**: [`Generator`] reads annotated sources and writes the
//!   DTO module, returning a [`GenerationReport`]
//! - **Configuration**: [`GeneratorConfig`] and [`GeneratorConfigBuilder`]
//! - **Source model**: [`model`] is the parsed view of the scanned project,
//!   including the declarative query schemas
//! - **Naming**: [`names`] holds the exact classification and name
//!   transforms generated code is built from
//!
//! # Pipeline
//!
//! ```text
//! source roots ─▶ reader ─▶ SourceModel ─▶ collector ─▶ emitters ─▶ .rs files
//! ```
//!
//! Structural problems abort the run with a [`GeneratorError`]: unparseable
//! sources, duplicate type or DTO names, invalid configuration, I/O. Every
//! per-member problem is logged through `tracing` instead and counted in the
//! report, so one odd field never fails a build.

mod collect;
mod config;
mod emit;
mod error;
mod generator;
pub mod model;
pub mod names;
mod reader;

pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use error::GeneratorError;
pub use generator::{GenerationReport, Generator};
