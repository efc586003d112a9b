//! 24-bit ANSI foreground colours and a box frame for result banners.

use rand::Rng;

const ESC: &str = "\u{1b}";
pub const RESET: &str = "\u{1b}[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    pub const ORANGE: Rgb = Rgb(255, 200, 0);
    pub const PINK: Rgb = Rgb(255, 175, 175);
    pub const GOLD: Rgb = Rgb::from_hex(0xD4AF37);
    pub const SILVER: Rgb = Rgb::from_hex(0xC0C0C0);
    pub const BRONZE: Rgb = Rgb::from_hex(0xB08D57);

    pub const fn from_hex(rgb: u32) -> Self {
        Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Rgb(rng.r#gen(), rng.r#gen(), rng.r#gen())
    }

    fn escape(self) -> String {
        let Rgb(r, g, b) = self;
        format!("{ESC}[38;2;{r};{g};{b}m")
    }
}

/// Whether the terminal is expected to understand 24-bit escapes.
pub fn enabled() -> bool {
    !cfg!(windows)
}

pub fn paint(text: &str, color: Rgb) -> String {
    paint_if(enabled(), text, color)
}

fn paint_if(enabled: bool, text: &str, color: Rgb) -> String {
    if enabled {
        format!("{}{text}{RESET}", color.escape())
    } else {
        text.to_string()
    }
}

pub trait Colorize {
    fn color(&self, color: Rgb) -> String;
}

impl<S: AsRef<str> + ?Sized> Colorize for S {
    fn color(&self, color: Rgb) -> String {
        paint(self.as_ref(), color)
    }
}

/// Draws a double-line box around `body`, with `title` set into the top edge.
pub fn frame(body: &str, title: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let title_width = if title.is_empty() {
        0
    } else {
        title.chars().count() + 2
    };
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(title_width);

    let mut out = String::new();
    if title.is_empty() {
        out.push_str(&format!("╔{}╗\n", "═".repeat(width + 2)));
    } else {
        let rest = width + 2 - title_width - 1;
        out.push_str(&format!("╔═ {title} {}╗\n", "═".repeat(rest)));
    }
    for line in &lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("║ {line}{} ║\n", " ".repeat(pad)));
    }
    out.push_str(&format!("╚{}╝", "═".repeat(width + 2)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_layout() {
        let painted = paint_if(true, "hi", Rgb(1, 2, 3));
        assert_eq!(painted, "\u{1b}[38;2;1;2;3mhi\u{1b}[0m");
        assert_eq!(paint_if(false, "hi", Rgb::RED), "hi");
    }

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Rgb::GOLD, Rgb(0xD4, 0xAF, 0x37));
        assert_eq!(Rgb::from_hex(0x010203), Rgb(1, 2, 3));
    }

    #[test]
    fn frame_wraps_every_line() {
        let framed = frame("alice wins\nwith a pair", "You Had: Pair");
        let lines: Vec<&str> = framed.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "╔═ You Had: Pair ═╗");
        assert_eq!(lines[1], format!("║ alice wins{} ║", " ".repeat(5)));
        assert_eq!(lines[3], format!("╚{}╝", "═".repeat(17)));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn untitled_frame() {
        assert_eq!(frame("x", ""), "╔═══╗\n║ x ║\n╚═══╝");
    }
}
