//! TUI rendering for the piano view
//!
//! Provides a ratatui widget that paints a [`PianoView`] into a terminal
//! buffer. Each terminal cell stands for a block of piano pixels; a cell
//! takes the colour of the topmost rectangle covering its centre.

use crate::config::TerminalSettings;
use crate::layout;
use crate::paint::{self, Canvas, RoundedRect};
use crate::view::PianoView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Mapping between terminal cells and piano pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    /// Terminal area the piano occupies
    pub area: Rect,
    pub pixels_per_column: u32,
    pub pixels_per_row: u32,
}

impl CellGrid {
    pub fn new(area: Rect, pixels_per_column: u32, pixels_per_row: u32) -> Self {
        Self {
            area,
            pixels_per_column: pixels_per_column.max(1),
            pixels_per_row: pixels_per_row.max(1),
        }
    }

    /// Piano size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            u32::from(self.area.width) * self.pixels_per_column,
            u32::from(self.area.height) * self.pixels_per_row,
        )
    }

    /// Pixels covered by a terminal cell, inclusive on all edges
    ///
    /// Cells outside the area map to pixels outside the piano.
    pub fn cell_pixels(&self, column: u16, row: u16) -> layout::Rect {
        let (ppc, ppr) = (self.pixels_per_column as i32, self.pixels_per_row as i32);
        let left = (i32::from(column) - i32::from(self.area.x)) * ppc;
        let top = (i32::from(row) - i32::from(self.area.y)) * ppr;
        layout::Rect::new(left, top, left + ppc - 1, top + ppr - 1)
    }

    /// Centre of a terminal cell in piano pixels, for pointer input
    pub fn cell_center(&self, column: u16, row: u16) -> (f32, f32) {
        let cell = self.cell_pixels(column, row);
        (
            cell.left as f32 + self.pixels_per_column as f32 / 2.0,
            cell.top as f32 + self.pixels_per_row as f32 / 2.0,
        )
    }
}

/// Give the view the pixel size of the grid, relaying out only on change
pub fn fit_view(view: &mut PianoView, grid: &CellGrid) {
    let size = grid.pixel_size();
    if view.size() != Some(size) {
        log::debug!("Piano area {:?} -> {}x{} px", grid.area, size.0, size.1);
        view.set_size(size.0, size.1);
    }
}

/// Convert a piano colour to a terminal colour
pub fn to_terminal_color(color: paint::Color) -> Color {
    Color::Rgb(color.red(), color.green(), color.blue())
}

/// [`Canvas`] painting into a ratatui buffer
pub struct BufferCanvas<'a> {
    buf: &'a mut Buffer,
    grid: CellGrid,
}

impl<'a> BufferCanvas<'a> {
    pub fn new(buf: &'a mut Buffer, grid: CellGrid) -> Self {
        Self { buf, grid }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shade {
    Fill,
    Stroke,
}

/// How a rectangle covers a cell, if at all
fn shade(rect: &RoundedRect, cell: layout::Rect, cx: i32, cy: i32) -> Option<Shade> {
    let b = rect.bounds;
    if !b.contains(cx, cy) || outside_corner(b, i64::from(rect.corner_radius), cx, cy) {
        return None;
    }
    // Wide strokes on huge views overflow i32
    let s = i64::from(rect.stroke_width);
    let on_stroke = s > 0
        && (i64::from(cell.left) < i64::from(b.left) + s
            || i64::from(cell.right) > i64::from(b.right) - s
            || i64::from(cell.top) < i64::from(b.top) + s
            || i64::from(cell.bottom) > i64::from(b.bottom) - s);
    Some(if on_stroke { Shade::Stroke } else { Shade::Fill })
}

/// Whether a point falls in a cut-off corner of a rounded rectangle
fn outside_corner(b: layout::Rect, radius: i64, x: i32, y: i32) -> bool {
    let (left, top, right, bottom) = (
        i64::from(b.left),
        i64::from(b.top),
        i64::from(b.right),
        i64::from(b.bottom),
    );
    let (x, y) = (i64::from(x), i64::from(y));
    let r = radius.min((right - left) / 2).min((bottom - top) / 2);
    if r <= 0 {
        return false;
    }
    let cx = if x < left + r {
        left + r
    } else if x > right - r {
        right - r
    } else {
        return false;
    };
    let cy = if y < top + r {
        top + r
    } else if y > bottom - r {
        bottom - r
    } else {
        return false;
    };
    let (dx, dy) = (i128::from(x - cx), i128::from(y - cy));
    dx * dx + dy * dy > i128::from(r) * i128::from(r)
}

impl Canvas for BufferCanvas<'_> {
    fn draw_rounded_rect(&mut self, rect: &RoundedRect) {
        let fill = to_terminal_color(rect.fill);
        let stroke = to_terminal_color(rect.stroke_color);
        let area = self.grid.area.intersection(self.buf.area);
        for row in area.top()..area.bottom() {
            for column in area.left()..area.right() {
                let cell = self.grid.cell_pixels(column, row);
                let (cx, cy) = self.grid.cell_center(column, row);
                let Some(shade) = shade(rect, cell, cx as i32, cy as i32) else {
                    continue;
                };
                let color = match shade {
                    Shade::Fill => fill,
                    Shade::Stroke => stroke,
                };
                if let Some(cell) = self.buf.cell_mut((column, row)) {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
    }
}

/// Piano widget for rendering in ratatui
///
/// The view must already be sized to the grid, see [`fit_view`].
pub struct PianoWidget<'a> {
    view: &'a PianoView,
    pixels_per_column: u32,
    pixels_per_row: u32,
}

impl<'a> PianoWidget<'a> {
    pub fn new(view: &'a PianoView, pixels_per_column: u32, pixels_per_row: u32) -> Self {
        Self {
            view,
            pixels_per_column,
            pixels_per_row,
        }
    }
}

impl<'a> Widget for PianoWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = CellGrid::new(area, self.pixels_per_column, self.pixels_per_row);
        self.view.draw(&mut BufferCanvas::new(buf, grid));
    }
}

/// Lines under the keyboard: status plus recent events
fn footer_height(area: Rect, settings: &TerminalSettings) -> u16 {
    let wanted = 1 + settings.event_log_len.min(usize::from(u16::MAX)) as u16;
    // Keep at least half the space for the keys
    wanted.min(area.height / 2)
}

fn inner_area(area: Rect) -> Rect {
    let margin = 1u16;
    Rect {
        x: area.x + margin + 1,
        y: area.y + margin + 1,
        width: area.width.saturating_sub(2 * margin + 2),
        height: area.height.saturating_sub(2 * margin + 2),
    }
}

/// Cell grid of the keyboard in the standalone screen
pub fn standalone_grid(area: Rect, settings: &TerminalSettings) -> CellGrid {
    let inner = inner_area(area);
    let keys = Rect {
        height: inner.height - footer_height(inner, settings),
        ..inner
    };
    CellGrid::new(keys, settings.pixels_per_column, settings.pixels_per_row)
}

/// Render the piano for the standalone application
///
/// `events` are the most recent listener events, newest last.
pub fn render_piano_standalone(
    frame: &mut Frame,
    area: Rect,
    view: &PianoView,
    settings: &TerminalSettings,
    events: &[String],
) {
    let margin = 1u16;
    let outer = Rect {
        x: area.x + margin,
        y: area.y + margin,
        width: area.width.saturating_sub(margin * 2),
        height: area.height.saturating_sub(margin * 2),
    };

    let highlighting = if view.is_multi_key_highlighting_enabled() {
        "multi"
    } else {
        "single"
    };
    let title = format!(
        " Piano [{} keys] ({}, {}) ",
        view.number_of_keys(),
        view.show_press_mode(),
        highlighting
    );
    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(to_terminal_color(view.key_stroke_color())));
    if settings.show_help {
        block = block.title_bottom(
            " +/- keys | m multi | p press mode | c clear | s save | r restore | q quit ",
        );
    }
    frame.render_widget(block, outer);

    let grid = standalone_grid(area, settings);
    frame.render_widget(
        PianoWidget::new(view, grid.pixels_per_column, grid.pixels_per_row),
        grid.area,
    );

    let inner = inner_area(area);
    let footer = Rect {
        y: grid.area.bottom(),
        height: inner.bottom().saturating_sub(grid.area.bottom()),
        ..inner
    };
    if footer.height == 0 {
        return;
    }

    let pressed = view.pressed_keys();
    let pressed_str = if pressed.is_empty() {
        "-".to_string()
    } else {
        pressed
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("Pressed: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            pressed_str,
            Style::default()
                .fg(to_terminal_color(view.pressed_key_color()))
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let shown = usize::from(footer.height - 1);
    let skip = events.len().saturating_sub(shown);
    lines.extend(
        events[skip..]
            .iter()
            .map(|e| Line::styled(e.clone(), Style::default().fg(Color::Gray))),
    );
    frame.render_widget(Paragraph::new(lines), footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PianoStyle;

    fn sized_view(style: PianoStyle, grid: &CellGrid) -> PianoView {
        let mut view = PianoView::new(style).unwrap();
        fit_view(&mut view, grid);
        view
    }

    #[test]
    fn test_cell_mapping() {
        let grid = CellGrid::new(Rect::new(2, 1, 70, 15), 10, 20);
        assert_eq!(grid.pixel_size(), (700, 300));
        assert_eq!(grid.cell_pixels(2, 1), layout::Rect::new(0, 0, 9, 19));
        assert_eq!(grid.cell_center(7, 1), (55.0, 10.0));
        // Left of the piano maps to negative pixels
        assert_eq!(grid.cell_center(0, 1).0, -15.0);
    }

    #[test]
    fn test_fit_view_only_relayouts_on_change() {
        let grid = CellGrid::new(Rect::new(0, 0, 70, 15), 10, 20);
        let mut view = sized_view(PianoStyle::default(), &grid);
        assert_eq!(view.size(), Some((700, 300)));
        view.take_redraw_request();
        fit_view(&mut view, &grid);
        assert!(!view.take_redraw_request());
    }

    #[test]
    fn test_widget_paints_keys() {
        let area = Rect::new(0, 0, 70, 15);
        let grid = CellGrid::new(area, 10, 20);
        let style = PianoStyle {
            number_of_keys: 12,
            key_stroke_width: 0,
            key_corner_radius: 0,
            ..PianoStyle::default()
        };
        let mut view = sized_view(style, &grid);
        view.show_key_pressed(4);

        let mut buf = Buffer::empty(area);
        PianoWidget::new(&view, 10, 20).render(area, &mut buf);

        let bg = |column: u16, row: u16| buf.cell((column, row)).unwrap().bg;
        // Key 0 low down, key 1 (black) near the top, key 4 pressed
        assert_eq!(bg(5, 14), Color::Rgb(255, 255, 255));
        assert_eq!(bg(9, 1), Color::Rgb(0, 0, 0));
        assert_eq!(bg(25, 14), Color::Rgb(0x4F, 0xC3, 0xF7));
    }

    #[test]
    fn test_stroke_cells() {
        let area = Rect::new(0, 0, 70, 15);
        let grid = CellGrid::new(area, 10, 20);
        let style = PianoStyle {
            number_of_keys: 12,
            key_stroke_width: 4,
            key_corner_radius: 0,
            white_key_color: paint::Color::rgb(200, 200, 200),
            key_stroke_color: paint::Color::rgb(255, 0, 0),
            ..PianoStyle::default()
        };
        let view = sized_view(style, &grid);
        let mut buf = Buffer::empty(area);
        PianoWidget::new(&view, 10, 20).render(area, &mut buf);

        let bg = |column: u16, row: u16| buf.cell((column, row)).unwrap().bg;
        assert_eq!(bg(0, 14), Color::Rgb(255, 0, 0));
        assert_eq!(bg(5, 10), Color::Rgb(200, 200, 200));
    }

    #[test]
    fn test_rounded_corners() {
        let b = layout::Rect::new(0, 0, 100, 100);
        assert!(outside_corner(b, 20, 1, 1));
        assert!(!outside_corner(b, 20, 10, 10));
        assert!(!outside_corner(b, 20, 50, 1));
        assert!(!outside_corner(b, 0, 0, 0));

        let wide = layout::Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert!(outside_corner(wide, i64::from(u32::MAX), i32::MIN, i32::MIN));
        assert!(!outside_corner(wide, i64::from(u32::MAX), 0, 0));
    }

    #[test]
    fn test_huge_stroke_is_all_stroke() {
        let rect = RoundedRect {
            shape: paint::Shape::Key(0),
            bounds: layout::Rect::new(-1_000_000_000, 0, i32::MAX, 200),
            fill: paint::Color::WHITE,
            stroke_color: paint::Color::rgb(255, 0, 0),
            stroke_width: u32::MAX,
            corner_radius: u32::MAX,
        };
        let cell = layout::Rect::new(0, 0, 10, 20);
        assert!(matches!(shade(&rect, cell, 5, 10), Some(Shade::Stroke)));
    }

    #[test]
    fn test_standalone_grid_leaves_room_for_footer() {
        let settings = TerminalSettings::default();
        let grid = standalone_grid(Rect::new(0, 0, 100, 40), &settings);
        assert_eq!(grid.area, Rect::new(2, 2, 96, 27));

        let tiny = standalone_grid(Rect::new(0, 0, 10, 8), &settings);
        assert_eq!(tiny.area.height, 2);
    }
}
