// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document writer abstraction.
//
// The page assembler only speaks in drawing primitives; serialisation into a
// concrete page format lives behind `DocumentWriter`. `PdfWriter` produces
// real PDF files, `RecordingWriter` keeps the primitives in memory for dry
// runs and tests.

use pagestorm_core::error::{Result, StormError};
use pagestorm_core::integrity::hash_bytes;
use pagestorm_core::{Color, FontFamily, PageSize, Point, Rect};
use serde::Serialize;

use crate::image::EncodedImage;

/// Sink for the drawing commands of a paginated document.
///
/// Coordinates are PDF points with the origin at the lower-left corner of the
/// page. A writer is opened by its constructor, receives pages in order, and
/// is finalized exactly once.
pub trait DocumentWriter {
    /// Size of the page currently being drawn.
    fn set_page_size(&mut self, size: PageSize);

    fn save_state(&mut self);

    fn restore_state(&mut self);

    fn set_stroke_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: f32);

    /// Stroke a straight segment.
    fn line(&mut self, from: Point, to: Point);

    /// Stroke a rectangle outline.
    fn rect(&mut self, rect: Rect);

    /// Stroke a circle outline.
    fn circle(&mut self, center: Point, radius: f32);

    /// Draw a single line of text with its baseline starting at `origin`.
    fn text(&mut self, origin: Point, font: FontFamily, size: f32, text: &str);

    /// Paint `image` stretched over `rect`.
    fn image(&mut self, image: &EncodedImage, rect: Rect) -> Result<()>;

    /// Close the current page and start a new, empty one.
    fn commit_page(&mut self) -> Result<()>;

    /// Flush everything to the output. Fails with `WriterClosed` when called
    /// a second time.
    fn finalize(&mut self) -> Result<()>;
}

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    SaveState,
    RestoreState,
    StrokeColor(Color),
    LineWidth(f32),
    Line { from: Point, to: Point },
    Rect(Rect),
    Circle { center: Point, radius: f32 },
    Text {
        origin: Point,
        font: FontFamily,
        size: f32,
        text: String,
    },
    Image {
        fingerprint: String,
        pixel_width: u32,
        pixel_height: u32,
        rect: Rect,
    },
}

/// A committed page and everything drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedPage {
    pub size: PageSize,
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    pub fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    pub fn lines(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Line { .. }))
    }

    pub fn rects(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Rect(_)))
    }

    pub fn circles(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Circle { .. }))
    }

    pub fn images(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// In-memory writer that records every primitive.
#[derive(Debug)]
pub struct RecordingWriter {
    pages: Vec<RecordedPage>,
    current: RecordedPage,
    finalized: bool,
}

impl RecordingWriter {
    pub fn new(initial_size: PageSize) -> Self {
        Self {
            pages: Vec::new(),
            current: RecordedPage {
                size: initial_size,
                ops: Vec::new(),
            },
            finalized: false,
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Total primitives across all committed pages.
    pub fn op_count(&self) -> usize {
        self.pages.iter().map(|page| page.ops.len()).sum()
    }

    /// SHA-256 over the serialized op stream of every committed page.
    pub fn fingerprint(&self) -> Result<String> {
        let encoded = serde_json::to_vec(&self.pages)?;
        Ok(hash_bytes(&encoded))
    }

    fn push(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }
}

impl DocumentWriter for RecordingWriter {
    fn set_page_size(&mut self, size: PageSize) {
        self.current.size = size;
    }

    fn save_state(&mut self) {
        self.push(DrawOp::SaveState);
    }

    fn restore_state(&mut self) {
        self.push(DrawOp::RestoreState);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.push(DrawOp::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.push(DrawOp::LineWidth(width));
    }

    fn line(&mut self, from: Point, to: Point) {
        self.push(DrawOp::Line { from, to });
    }

    fn rect(&mut self, rect: Rect) {
        self.push(DrawOp::Rect(rect));
    }

    fn circle(&mut self, center: Point, radius: f32) {
        self.push(DrawOp::Circle { center, radius });
    }

    fn text(&mut self, origin: Point, font: FontFamily, size: f32, text: &str) {
        self.push(DrawOp::Text {
            origin,
            font,
            size,
            text: text.to_owned(),
        });
    }

    fn image(&mut self, image: &EncodedImage, rect: Rect) -> Result<()> {
        if self.finalized {
            return Err(StormError::WriterClosed);
        }
        self.push(DrawOp::Image {
            fingerprint: image.fingerprint().to_owned(),
            pixel_width: image.width(),
            pixel_height: image.height(),
            rect,
        });
        Ok(())
    }

    fn commit_page(&mut self) -> Result<()> {
        if self.finalized {
            return Err(StormError::WriterClosed);
        }
        let next = RecordedPage {
            size: self.current.size,
            ops: Vec::new(),
        };
        self.pages.push(std::mem::replace(&mut self.current, next));
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(StormError::WriterClosed);
        }
        self.finalized = true;
        Ok(())
    }
}
