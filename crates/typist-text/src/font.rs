#![forbid(unsafe_code)]

//! Font collaborator contract.
//!
//! The core never loads fonts. It asks a [`FontMetrics`] how wide a glyph is
//! and how tall a line is, and treats the answers as pure queries.

use typist_render::{Glyph, StyleFlags};
use unicode_width::UnicodeWidthChar;

use crate::layout::{Layout, Line};

/// Glyph metrics provider.
pub trait FontMetrics {
    /// Horizontal advance of one glyph, scale included.
    fn advance(&self, glyph: Glyph) -> f32;

    /// Height of an unscaled line.
    fn line_height(&self) -> f32;

    /// Height a single glyph contributes to its line.
    fn glyph_height(&self, glyph: Glyph) -> f32 {
        self.line_height() * glyph.scale()
    }

    /// Total advance of a run of glyphs.
    fn measure_width(&self, glyphs: &[Glyph]) -> f32 {
        glyphs.iter().map(|&g| self.advance(g)).sum()
    }

    /// Tallest glyph in the run, or one line height for an empty run.
    fn measure_height(&self, glyphs: &[Glyph]) -> f32 {
        glyphs
            .iter()
            .map(|&g| self.glyph_height(g))
            .fold(None, |acc: Option<f32>, h| Some(acc.map_or(h, |a| a.max(h))))
            .unwrap_or_else(|| self.line_height())
    }

    /// Measure one line, filling its cached width and height.
    fn measure_line(&self, line: &mut Line) {
        let width = self.measure_width(line.glyphs());
        let height = self.measure_height(line.glyphs());
        line.set_metrics(width, height);
    }

    /// Measure every line and refresh the layout's cached totals.
    fn calculate_size(&self, layout: &mut Layout) {
        layout.calculate_size(self);
    }
}

impl<T: FontMetrics + ?Sized> FontMetrics for &T {
    fn advance(&self, glyph: Glyph) -> f32 {
        (**self).advance(glyph)
    }

    fn line_height(&self) -> f32 {
        (**self).line_height()
    }

    fn glyph_height(&self, glyph: Glyph) -> f32 {
        (**self).glyph_height(glyph)
    }
}

/// Fixed-cell font: every glyph advances by its terminal column width.
///
/// Wide (CJK, emoji) characters take two cells, control characters and
/// line breaks take none. Script positions render at half scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceFont {
    cell_width: f32,
    line_height: f32,
}

impl Default for MonospaceFont {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl MonospaceFont {
    /// Font with the given cell size.
    pub const fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }

    /// Width of one cell.
    pub const fn cell_width(&self) -> f32 {
        self.cell_width
    }

    fn effective_scale(glyph: Glyph) -> f32 {
        let scale = glyph.scale();
        if glyph.style().intersects(StyleFlags::SCRIPTS) {
            scale * 0.5
        } else {
            scale
        }
    }
}

impl FontMetrics for MonospaceFont {
    fn advance(&self, glyph: Glyph) -> f32 {
        let ch = glyph.ch();
        if ch.is_control() {
            return 0.0;
        }
        let cols = ch.width().unwrap_or(0) as f32;
        cols * self.cell_width * Self::effective_scale(glyph)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn glyph_height(&self, glyph: Glyph) -> f32 {
        self.line_height * Self::effective_scale(glyph)
    }
}
