// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagestorm generator. All lengths are PDF points
// (1/72 inch) unless a name says otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StormError;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Physical page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4, portrait.
    pub const A4: Self = Self {
        width: 210.0 * MM,
        height: 297.0 * MM,
    };

    /// US Letter, portrait.
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The same sheet turned on its side.
    pub fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            Self {
                width: self.height,
                height: self.width,
            }
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Bit-exact key used by caches, since `f32` is not `Hash`.
    pub fn key(&self) -> SizeKey {
        SizeKey(self.width.to_bits(), self.height.to_bits())
    }

    pub fn width_mm(&self) -> f32 {
        self.width / MM
    }

    pub fn height_mm(&self) -> f32 {
        self.height / MM
    }
}

/// Hashable form of a [`PageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeKey(u32, u32);

/// Page orientation, implied by the aspect of a [`PageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// One page of the run: its 1-based index and resolved size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub index: u32,
    pub size: PageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its lower-left corner (PDF space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// RGB stroke color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::gray(0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}

/// The standard-14 font families a document writer can use without embedding.
/// Serialized by PostScript name, so JSON configs and the command line accept
/// the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FontFamily {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    Courier,
    CourierBold,
    CourierOblique,
}

impl FontFamily {
    /// PostScript name, as written in the metadata line of every page.
    pub fn postscript_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
        }
    }

    pub const ALL: [Self; 9] = [
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaOblique,
        Self::TimesRoman,
        Self::TimesBold,
        Self::TimesItalic,
        Self::Courier,
        Self::CourierBold,
        Self::CourierOblique,
    ];
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.postscript_name())
    }
}

impl FromStr for FontFamily {
    type Err = StormError;

    /// Accepts PostScript names case-insensitively ("Times-Roman", "courier").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|font| font.postscript_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StormError::InvalidConfiguration(format!("unknown font: {s}")))
    }
}

impl TryFrom<String> for FontFamily {
    type Error = StormError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<FontFamily> for String {
    fn from(font: FontFamily) -> Self {
        font.postscript_name().to_owned()
    }
}
