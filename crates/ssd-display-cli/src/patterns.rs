//! Demo test patterns.

use ssd_display_hw::{Color565, DisplayConfig, Line, Point, Rect};

/// Row stripes cycling red, black and blue.
pub fn stripe_color(point: Point) -> Color565 {
    match point.y % 3 {
        0 => Color565::RED,
        1 => Color565::BLACK,
        _ => Color565::BLUE,
    }
}

/// Line for step `i` of the sweep: pivots from the top edge to the bottom
/// edge while the blue channel ramps up.
pub fn sweep_line(config: &DisplayConfig, i: u8) -> (Line, Color565) {
    let max_y = config.max_y();
    let line = Line::new(0, i, config.max_x(), max_y.saturating_sub(i));
    (line, Color565::new(0x1F, 0, i))
}

/// Three full-height columns in dark red, white and dark blue.
pub fn columns(config: &DisplayConfig) -> [(Rect, Color565); 3] {
    let width = config.width();
    let column = |i: u16| {
        let x0 = (i * width / 3) as u8;
        let x1 = ((i + 1) * width / 3).saturating_sub(1) as u8;
        Rect::new(x0, 0, x1, config.max_y())
    };
    [
        (column(0), Color565::new(0x10, 0, 0)),
        (column(1), Color565::WHITE),
        (column(2), Color565::new(0, 0, 0x10)),
    ]
}
