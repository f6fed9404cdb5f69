// Color roles for the board, normalized across terminals
// 16-color names are mapped to fixed RGB / 256 values when the terminal can show them

use ratatui::style::Color;
use term_color_support::ColorSupport;

fn normalize_with(color: Color, has_16m: bool, has_256: bool) -> Color {
    // ((R, G, B), 256-color index)
    let mapping = match color {
        Color::Black => Some(((12, 12, 12), 232)),
        Color::Red => Some(((197, 15, 31), 160)),
        Color::Green => Some(((19, 161, 14), 28)),
        Color::Yellow => Some(((193, 156, 0), 178)),
        Color::Blue => Some(((0, 55, 218), 20)),
        Color::Magenta => Some(((136, 23, 152), 90)),
        Color::Cyan => Some(((58, 150, 221), 38)),
        Color::Gray => Some(((204, 204, 204), 250)),
        Color::DarkGray => Some(((118, 118, 118), 243)),
        Color::LightRed => Some(((231, 72, 86), 203)),
        Color::LightGreen => Some(((22, 198, 12), 46)),
        Color::LightYellow => Some(((249, 241, 165), 229)),
        Color::LightBlue => Some(((59, 120, 255), 63)),
        Color::LightMagenta => Some(((180, 0, 158), 163)),
        Color::LightCyan => Some(((97, 214, 214), 116)),
        Color::White => Some(((242, 242, 242), 255)),
        _ => None,
    };
    match mapping {
        Some(((r, g, b), _)) if has_16m => Color::Rgb(r, g, b),
        Some((_, index)) if has_256 => Color::Indexed(index),
        _ => color,
    }
}

/// Colors used by the game screen, resolved once at startup
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub numbers: [Color; 8], // Classic colors for 1..8
    pub hidden: Color,
    pub revealed_bg: Color,
    pub flag: Color,
    pub mine: Color,
    pub exploded_bg: Color,
    pub wrong_flag: Color,
    pub cursor_bg: Color,
    pub pressed_bg: Color,
    pub menu_key: Color,
    pub menu_text: Color,
    pub border: Color,
    pub warning: Color,
}

impl Palette {
    pub fn detect() -> Self {
        let support = ColorSupport::stdout();
        Self::build(|c| normalize_with(c, support.has_16m, support.has_256))
    }

    pub(crate) fn build(norm: impl Fn(Color) -> Color) -> Self {
        Palette {
            numbers: [
                norm(Color::LightBlue),
                norm(Color::Green),
                norm(Color::Red),
                norm(Color::Magenta),
                norm(Color::Yellow),
                norm(Color::Cyan),
                norm(Color::White),
                norm(Color::Gray),
            ],
            hidden: norm(Color::Gray),
            revealed_bg: norm(Color::Black),
            flag: norm(Color::LightRed),
            mine: norm(Color::White),
            exploded_bg: norm(Color::Red),
            wrong_flag: norm(Color::LightYellow),
            cursor_bg: norm(Color::LightBlue),
            pressed_bg: norm(Color::DarkGray),
            menu_key: norm(Color::LightCyan),
            menu_text: norm(Color::White),
            border: norm(Color::Gray),
            warning: norm(Color::LightRed),
        }
    }

    /// Foreground for a revealed cell showing `n` (1..=8)
    pub fn number(&self, n: u8) -> Color {
        self.numbers[(n.clamp(1, 8) - 1) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_richest_supported_form() {
        assert_eq!(normalize_with(Color::Red, true, true), Color::Rgb(197, 15, 31));
        assert_eq!(normalize_with(Color::Red, false, true), Color::Indexed(160));
        assert_eq!(normalize_with(Color::Red, false, false), Color::Red);
        assert_eq!(normalize_with(Color::Rgb(1, 2, 3), true, true), Color::Rgb(1, 2, 3));
        assert_eq!(normalize_with(Color::LightMagenta, false, true), Color::Indexed(163));
    }

    #[test]
    fn numbers_use_classic_colors() {
        let p = Palette::build(|c| c);
        assert_eq!(p.number(1), Color::LightBlue);
        assert_eq!(p.number(3), Color::Red);
        assert_eq!(p.number(8), Color::Gray);
        assert_eq!(p.number(0), Color::LightBlue);
    }
}
