// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagestorm-document — Page synthesis for the Pagestorm generator.
//
// Provides the document writer abstraction (PDF and in-memory recording
// backends), the cached generators for vector figures and raster textures,
// the filler/placement planners, and the page assembler that composes them
// into a full stress-test document.

pub mod assembler;
pub mod canvas;
pub mod figures;
pub mod generator;
pub mod image;
pub mod layout;
pub mod pdf;

// Re-export the primary structs so callers can use `pagestorm_document::PdfWriter` etc.
pub use assembler::PageAssembler;
pub use canvas::{DocumentWriter, DrawOp, RecordedPage, RecordingWriter};
pub use figures::{FigureCache, FigureSet};
pub use generator::{GenerationReport, StressGenerator};
pub use image::{EncodedImage, TextureCache, TextureKey};
pub use layout::{FillerPlanner, LayoutMode, PlacementPlanner};
pub use pdf::PdfWriter;
