#![forbid(unsafe_code)]

//! Per-frame render output.

use typist_render::Glyph;

use crate::scheduler::RevealState;

/// One visible glyph, placed and transformed.
///
/// `x`/`y` is the top-left of the glyph's cell in layout units; the `d*`
/// fields are the effect offsets on top of it, `y` growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphCell {
    /// Layout index.
    pub index: usize,
    /// Line the glyph sits on.
    pub line: usize,
    /// Glyph to draw, effects applied.
    pub glyph: Glyph,
    /// Pen position.
    pub x: f32,
    /// Top of the line.
    pub y: f32,
    /// Horizontal effect offset.
    pub dx: f32,
    /// Vertical effect offset.
    pub dy: f32,
    /// Horizontal size factor.
    pub sx: f32,
    /// Vertical size factor.
    pub sy: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
}

impl GlyphCell {
    /// Horizontal draw position.
    pub fn draw_x(&self) -> f32 {
        self.x + self.dx
    }

    /// Vertical draw position.
    pub fn draw_y(&self) -> f32 {
        self.y + self.dy
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphFrame {
    /// Visible glyphs in index order.
    pub cells: Vec<GlyphCell>,
    /// Number of visible glyphs.
    pub visible: usize,
    /// Number of glyphs in the layout.
    pub total: usize,
    /// Seconds of reveal time counted so far.
    pub elapsed: f32,
    /// Layout width.
    pub width: f32,
    /// Layout height.
    pub height: f32,
    /// Reveal state after the update.
    pub state: RevealState,
}

impl Default for GlyphFrame {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            visible: 0,
            total: 0,
            elapsed: 0.0,
            width: 0.0,
            height: 0.0,
            state: RevealState::Running,
        }
    }
}

impl GlyphFrame {
    /// Characters of the visible glyphs, line breaks included.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.glyph.ch()).collect()
    }

    /// Whether every glyph is visible.
    pub fn is_complete(&self) -> bool {
        self.visible >= self.total
    }

    /// Cell for layout index `index`, if visible.
    pub fn cell(&self, index: usize) -> Option<&GlyphCell> {
        self.cells.get(index).filter(|c| c.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typist_render::PackedRgba;

    fn cell(index: usize, ch: char) -> GlyphCell {
        GlyphCell {
            index,
            line: 0,
            glyph: Glyph::from_char(ch, PackedRgba::WHITE),
            x: index as f32,
            y: 0.0,
            dx: 0.5,
            dy: -1.0,
            sx: 1.0,
            sy: 1.0,
            rotation: 0.0,
        }
    }

    #[test]
    fn text_and_lookup() {
        let frame = GlyphFrame {
            cells: vec![cell(0, 'h'), cell(1, 'i')],
            visible: 2,
            total: 3,
            ..GlyphFrame::default()
        };
        assert_eq!(frame.text(), "hi");
        assert!(!frame.is_complete());
        assert_eq!(frame.cell(1).map(|c| c.draw_x()), Some(1.5));
        assert_eq!(frame.cell(1).map(|c| c.draw_y()), Some(-1.0));
        assert!(frame.cell(2).is_none());
    }
}
