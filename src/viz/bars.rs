//! Level bar widget for ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// Width of the "ch00 " prefix
const PREFIX_WIDTH: u16 = 5;
/// Width of the " 0.00" suffix
const SUFFIX_WIDTH: u16 = 5;

/// One horizontal bar per channel, top to bottom in channel order
pub struct LevelBars<'a> {
    levels: &'a [f64],
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> LevelBars<'a> {
    pub fn new(levels: &'a [f64]) -> Self {
        Self {
            levels,
            style: Style::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Cells filled for a level on a bar of the given width.
    ///
    /// Warm-up levels outside 0..1 are pinned to the ends.
    pub fn filled(level: f64, width: u16) -> u16 {
        let ratio = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
        (ratio * width as f64).round() as u16
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer) {
        if area.width <= PREFIX_WIDTH + SUFFIX_WIDTH || area.height == 0 {
            return;
        }
        let bar_width = area.width - PREFIX_WIDTH - SUFFIX_WIDTH;

        for (row, &level) in self.levels.iter().enumerate().take(area.height as usize) {
            let y = area.y + row as u16;
            buf.set_string(area.x, y, format!("ch{:<2} ", row), Style::default());

            let filled = Self::filled(level, bar_width);
            for dx in 0..bar_width {
                let symbol = if dx < filled { "█" } else { "·" };
                let style = if dx < filled { self.style } else { Style::default() };
                buf.set_string(area.x + PREFIX_WIDTH + dx, y, symbol, style);
            }

            let value = if (0.0..=9.99).contains(&level) {
                format!(" {:.2}", level)
            } else {
                " ----".to_string()
            };
            buf.set_string(area.x + PREFIX_WIDTH + bar_width, y, value, Style::default());
        }
    }
}

impl Widget for LevelBars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_bars(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cells() {
        assert_eq!(LevelBars::filled(0.0, 20), 0);
        assert_eq!(LevelBars::filled(0.5, 20), 10);
        assert_eq!(LevelBars::filled(1.0, 20), 20);
        assert_eq!(LevelBars::filled(310.0, 20), 20);
        assert_eq!(LevelBars::filled(f64::NAN, 20), 0);
    }

    #[test]
    fn test_bars_render_rows() {
        let levels = [0.0, 1.0];
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        LevelBars::new(&levels).render(area, &mut buf);

        // Bar spans columns 5..15
        assert_eq!(buf[(5, 0)].symbol(), "·");
        assert_eq!(buf[(5, 1)].symbol(), "█");
        assert_eq!(buf[(14, 1)].symbol(), "█");
    }

    #[test]
    fn test_bars_too_narrow() {
        let levels = [0.5];
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);
        LevelBars::new(&levels).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }
}
