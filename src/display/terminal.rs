use super::error::RenderError;
use super::MatrixBackend;
use crate::renderer::frame::MatrixFrame;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;

const CURSOR_HOME: &str = "\x1b[H";
const CLEAR_SCREEN: &str = "\x1b[2J";
const RESET_COLORS: &str = "\x1b[0m";
const UPPER_HALF_BLOCK: char = '\u{2580}';

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStyle {
    /// Truecolor half blocks, two pixel rows per terminal line.
    Ansi,
    /// `#` for lit pixels, `.` for dark ones.
    Ascii,
}

/// Console stand-in for the LED matrix.
pub struct TerminalBackend<W: std::io::Write + Send> {
    writer: W,
    style: TerminalStyle,
}

impl TerminalBackend<std::io::Stdout> {
    #[must_use]
    pub fn stdout(style: TerminalStyle) -> Self {
        TerminalBackend::new(std::io::stdout(), style)
    }
}

impl<W: std::io::Write + Send> TerminalBackend<W> {
    pub fn new(writer: W, style: TerminalStyle) -> Self {
        TerminalBackend { writer, style }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: std::io::Write + Send + 'static> MatrixBackend for TerminalBackend<W> {
    fn present(&mut self, frame: &MatrixFrame) -> Result<(), RenderError> {
        let text = match self.style {
            TerminalStyle::Ansi => ansi_text(frame),
            TerminalStyle::Ascii => ascii_text(frame),
        };
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        if self.style == TerminalStyle::Ansi {
            write!(self.writer, "{RESET_COLORS}{CLEAR_SCREEN}{CURSOR_HOME}")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn ansi_text(frame: &MatrixFrame) -> String {
    let mut text = String::from(CURSOR_HOME);
    for pair in frame.rows().chunks(2) {
        let upper = &pair[0];
        let lower = pair.get(1);
        for (x, top) in upper.iter().enumerate() {
            let bottom = lower.map_or(Rgb888::BLACK, |row| row[x]);
            text.push_str(&format!(
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{UPPER_HALF_BLOCK}",
                top.r(),
                top.g(),
                top.b(),
                bottom.r(),
                bottom.g(),
                bottom.b()
            ));
        }
        text.push_str(RESET_COLORS);
        text.push('\n');
    }
    text
}

fn ascii_text(frame: &MatrixFrame) -> String {
    let mut text = String::new();
    for row in frame.rows() {
        text.extend(
            row.iter()
                .map(|&color| if color == Rgb888::BLACK { '.' } else { '#' }),
        );
        text.push('\n');
    }
    text.push('\n');
    text
}
