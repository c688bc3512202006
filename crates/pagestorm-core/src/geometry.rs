// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry cycler — maps a page index to its size before any content is
// generated, since caches are keyed on size.

use crate::types::PageSize;

/// Sizes visited when size variation is on, indexed by `page % 4`.
const ROTATION: [PageSize; 4] = [
    PageSize::A4,
    PageSize::LETTER,
    PageSize::new(PageSize::A4.height, PageSize::A4.width),
    PageSize::new(PageSize::LETTER.height, PageSize::LETTER.width),
];

/// Size of page `index`. Without variation every page is A4 portrait.
pub fn size_for(index: u32, vary: bool) -> PageSize {
    if !vary {
        return PageSize::A4;
    }
    ROTATION[(index % 4) as usize]
}
