// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the lopdf-backed document writer and its text encoding.

pub mod winansi;
pub mod writer;

pub use writer::PdfWriter;
