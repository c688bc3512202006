// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagestorm — Core types, configuration, and the deterministic building blocks
// (seeded RNG streams, page geometry, text layout, keyed caches) shared by the
// document generator and the command-line front end.

pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod integrity;
pub mod rng;
pub mod text;
pub mod types;

pub use cache::KeyedCache;
pub use config::{GenerationConfig, ImageSettings};
pub use error::StormError;
pub use types::*;
