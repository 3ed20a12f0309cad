#![forbid(unsafe_code)]

//! Layout model: lines of packed glyphs plus paragraph attributes.
//!
//! A [`Layout`] is filled by the markup parser one glyph at a time through
//! [`Layout::push_glyph`], which owns word wrapping and the max-lines limit.
//! Once parsed, the layout is read-only for reveal and rendering.
//!
//! Glyph indices are global: glyph `i` is the `i`th glyph in line order.
//! Wrapping moves glyphs between lines but never reorders or drops them, so
//! token indices stay valid.
//!
//! A layout can be reused across parses: [`Layout::clear`] drops the lines
//! but keeps their allocations and the paragraph attributes.

use typist_render::{Glyph, PackedRgba};

use crate::font::FontMetrics;

/// One visual line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    glyphs: Vec<Glyph>,
    width: f32,
    height: f32,
}

impl Line {
    /// Empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Glyphs in visual order.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the line has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Cached width (valid after measuring).
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Cached height (valid after measuring).
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Overwrite the cached metrics.
    pub fn set_metrics(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Plain text of the line.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch()).collect()
    }

    fn reset(&mut self) {
        self.glyphs.clear();
        self.width = 0.0;
        self.height = 0.0;
    }

    /// Last index `i` such that glyph `i` is breakable whitespace with at
    /// least one glyph after it.
    fn last_break(&self) -> Option<usize> {
        let n = self.glyphs.len();
        self.glyphs[..n.saturating_sub(1)]
            .iter()
            .rposition(|g| g.is_whitespace() && !g.is_newline())
    }
}

/// Lines of glyphs plus paragraph attributes.
#[derive(Debug, Clone)]
pub struct Layout {
    lines: Vec<Line>,
    /// Lines in `lines` that are in use; the tail is spare capacity.
    used: usize,
    target_width: f32,
    max_lines: usize,
    ellipsis: Option<String>,
    base_color: PackedRgba,
    width: f32,
    height: f32,
    glyph_count: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// Unconstrained layout with an opaque white base color.
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            used: 0,
            target_width: 0.0,
            max_lines: usize::MAX,
            ellipsis: None,
            base_color: PackedRgba::WHITE,
            width: 0.0,
            height: 0.0,
            glyph_count: 0,
        }
    }

    // ------------------------------------------------------------------
    // Paragraph attributes
    // ------------------------------------------------------------------

    /// Wrap width; `0` (or less) disables wrapping.
    #[must_use]
    pub fn with_target_width(mut self, width: f32) -> Self {
        self.set_target_width(width);
        self
    }

    /// Maximum number of lines; values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.set_max_lines(max_lines);
        self
    }

    /// Text appended to the last line when content is cut at the limit.
    #[must_use]
    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = Some(ellipsis.into());
        self
    }

    /// Default glyph color.
    #[must_use]
    pub fn with_base_color(mut self, color: impl Into<PackedRgba>) -> Self {
        self.set_base_color(color);
        self
    }

    /// Wrap width.
    pub fn target_width(&self) -> f32 {
        self.target_width
    }

    /// Set the wrap width.
    pub fn set_target_width(&mut self, width: f32) {
        self.target_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    /// Line limit (`usize::MAX` when unlimited).
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Set the line limit.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines.max(1);
    }

    /// Ellipsis text.
    pub fn ellipsis(&self) -> Option<&str> {
        self.ellipsis.as_deref()
    }

    /// Set or clear the ellipsis text.
    pub fn set_ellipsis(&mut self, ellipsis: Option<String>) {
        self.ellipsis = ellipsis;
    }

    /// Base color.
    pub fn base_color(&self) -> PackedRgba {
        self.base_color
    }

    /// Set the base color from a packed value, a structured color, or float
    /// channels.
    pub fn set_base_color(&mut self, color: impl Into<PackedRgba>) {
        self.base_color = color.into();
    }

    // ------------------------------------------------------------------
    // Lines and glyphs
    // ------------------------------------------------------------------

    /// Lines in visual order.
    pub fn lines(&self) -> &[Line] {
        &self.lines[..self.used]
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.used
    }

    /// Total glyphs across all lines.
    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Whether no glyphs are present.
    pub fn is_empty(&self) -> bool {
        self.glyph_count == 0
    }

    /// All glyphs in global index order.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph> + '_ {
        self.lines().iter().flat_map(|l| l.glyphs.iter().copied())
    }

    /// Glyph at a global index.
    pub fn glyph(&self, index: usize) -> Option<Glyph> {
        let (line, col) = self.position_of(index)?;
        Some(self.lines[line].glyphs[col])
    }

    /// `(line, column)` of a global index.
    pub fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        let mut rest = index;
        for (i, line) in self.lines().iter().enumerate() {
            if rest < line.len() {
                return Some((i, rest));
            }
            rest -= line.len();
        }
        None
    }

    /// Plain text of the whole layout.
    pub fn text(&self) -> String {
        self.glyphs().map(|g| g.ch()).collect()
    }

    /// Append an empty line. Refused (returns `false`) at the line limit.
    pub fn push_line(&mut self) -> bool {
        if self.used >= self.max_lines {
            return false;
        }
        if self.used == self.lines.len() {
            self.lines.push(Line::new());
        } else {
            self.lines[self.used].reset();
        }
        self.used += 1;
        true
    }

    /// Append a glyph, wrapping as needed.
    ///
    /// A line break glyph ends the current line. When the wrap width would
    /// be exceeded, the line is broken after its last whitespace run, or
    /// before the new glyph if the line has no whitespace. Whitespace itself
    /// may overhang the width.
    ///
    /// Returns `false` if a new line was needed and the limit refused it;
    /// the glyph is then not appended.
    pub fn push_glyph<F: FontMetrics + ?Sized>(&mut self, glyph: Glyph, font: &F) -> bool {
        if self.used == 0 && !self.push_line() {
            return false;
        }
        let last = self.used - 1;
        if self.lines[last].glyphs.last().is_some_and(|g| g.is_newline()) {
            if !self.push_line() {
                return false;
            }
            return self.push_glyph(glyph, font);
        }

        let advance = font.advance(glyph);
        let line = &self.lines[last];
        let overflows = self.target_width > 0.0
            && !line.is_empty()
            && !glyph.is_whitespace()
            && line.width + advance > self.target_width;

        if overflows {
            let carried = match line.last_break() {
                Some(i) => self.lines[last].glyphs.split_off(i + 1),
                None => Vec::new(),
            };
            if !self.push_line() {
                self.lines[last].glyphs.extend(carried);
                return false;
            }
            let prev_width = font.measure_width(&self.lines[last].glyphs);
            self.lines[last].width = prev_width;
            let next = self.used - 1;
            self.lines[next].glyphs = carried;
            self.lines[next].width = font.measure_width(&self.lines[next].glyphs);
        }

        let current = self.used - 1;
        self.lines[current].glyphs.push(glyph);
        self.lines[current].width += advance;
        self.glyph_count += 1;
        true
    }

    /// Cut the last line so `ellipsis` (rendered with `template`'s style)
    /// fits within the wrap width, then append it.
    ///
    /// Trailing line breaks are removed first. Returns the number of content
    /// glyphs that remain before the ellipsis.
    pub fn apply_ellipsis<F: FontMetrics + ?Sized>(&mut self, template: Glyph, font: &F) -> usize {
        let Some(ellipsis) = self.ellipsis.clone() else {
            return self.glyph_count;
        };
        if self.used == 0 {
            self.push_line();
        }
        let target = self.target_width;
        let last = self.used - 1;
        let tail: Vec<Glyph> = ellipsis.chars().map(|c| template.with_char(c)).collect();
        let tail_width = font.measure_width(&tail);

        let line = &mut self.lines[last];
        while line.glyphs.last().is_some_and(|g| g.is_newline()) {
            line.glyphs.pop();
            self.glyph_count -= 1;
        }
        if target > 0.0 {
            while !line.glyphs.is_empty() && font.measure_width(&line.glyphs) + tail_width > target {
                line.glyphs.pop();
                self.glyph_count -= 1;
            }
        }
        let kept = self.glyph_count;
        self.glyph_count += tail.len();
        line.glyphs.extend(tail);
        line.width = font.measure_width(&line.glyphs);
        kept
    }

    /// Overwrite a glyph in place (used when relayout recolors text).
    pub fn set_glyph(&mut self, index: usize, glyph: Glyph) -> bool {
        match self.position_of(index) {
            Some((line, col)) => {
                self.lines[line].glyphs[col] = glyph;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Metrics and lifecycle
    // ------------------------------------------------------------------

    /// Measure every line and cache the totals: width is the widest line,
    /// height the sum of line heights.
    pub fn calculate_size<F: FontMetrics + ?Sized>(&mut self, font: &F) {
        let mut width: f32 = 0.0;
        let mut height = 0.0;
        for line in &mut self.lines[..self.used] {
            font.measure_line(line);
            width = width.max(line.width);
            height += line.height;
        }
        self.width = width;
        self.height = height;
    }

    /// Cached total width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Cached total height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Drop all lines and cached metrics; attributes and allocations stay.
    pub fn clear(&mut self) {
        for line in &mut self.lines[..self.used] {
            line.reset();
        }
        self.used = 0;
        self.glyph_count = 0;
        self.width = 0.0;
        self.height = 0.0;
    }
}
