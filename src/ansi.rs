use std::io::{self, Write};

use crossterm::{
    queue,
    style::{
        Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Line,
};
use unicode_width::UnicodeWidthChar;

const ATTRIBUTES: [(Modifier, Attribute); 6] = [
    (Modifier::BOLD, Attribute::Bold),
    (Modifier::DIM, Attribute::Dim),
    (Modifier::ITALIC, Attribute::Italic),
    (Modifier::UNDERLINED, Attribute::Underlined),
    (Modifier::REVERSED, Attribute::Reverse),
    (Modifier::CROSSED_OUT, Attribute::CrossedOut),
];

/// Writes rendered lines as SGR-styled text, cutting each line at `width`
/// display columns.
pub fn write_lines<W: Write>(out: &mut W, lines: &[Line<'_>], width: Option<usize>) -> io::Result<()> {
    for line in lines {
        let mut column = 0;
        for span in &line.spans {
            let (text, used) = fit_width(&span.content, remaining(width, column));
            column += used;
            if text.is_empty() {
                continue;
            }
            queue_style(out, span.style.patch(line.style))?;
            queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

/// Like [`write_lines`] without any escape sequences.
pub fn write_plain<W: Write>(out: &mut W, lines: &[Line<'_>], width: Option<usize>) -> io::Result<()> {
    for line in lines {
        let mut column = 0;
        for span in &line.spans {
            let (text, used) = fit_width(&span.content, remaining(width, column));
            column += used;
            out.write_all(text.as_bytes())?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Display width of a rendered line.
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .flat_map(|span| span.content.chars())
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn remaining(width: Option<usize>, column: usize) -> usize {
    width.map_or(usize::MAX, |width| width.saturating_sub(column))
}

/// Longest prefix of `text` that fits into `available` columns.
fn fit_width(text: &str, available: usize) -> (&str, usize) {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > available {
            return (&text[..idx], used);
        }
        used += width;
    }
    (text, used)
}

fn queue_style<W: Write>(out: &mut W, style: Style) -> io::Result<()> {
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(term_color(fg)))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(term_color(bg)))?;
    }
    let modifiers = style.add_modifier.difference(style.sub_modifier);
    for (modifier, attribute) in ATTRIBUTES {
        if modifiers.contains(modifier) {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(value) => TermColor::AnsiValue(value),
    }
}
