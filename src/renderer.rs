mod constants;
pub mod frame;

use crate::config::DisplayConfig;
use crate::types::{FeedStatus, FlightRecord, Snapshot};
use constants::{
    ALTITUDE_COLUMN, CALLSIGN_CHARS, ERROR_COLOR, FLIGHT_ROWS_PER_PAGE, GLYPH_WIDTH,
    HIGH_ALTITUDE_COLOR, LINE_HEIGHT, LOW_ALTITUDE_COLOR, LOW_ALTITUDE_FT, MAX_ALTITUDE_FT,
    MAX_SHOWN_COUNT, MAX_SHOWN_PAGES, MID_ALTITUDE_COLOR, MID_ALTITUDE_FT, STATUS_COLOR,
    STATUS_LINE, TEXT_LEFT, TEXT_TOP,
};
use embedded_graphics::mono_font::{ascii::FONT_4X6, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Drawable, Point};
use embedded_graphics::text::{Baseline, Text};
use frame::{MatrixFrame, MATRIX_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub text_color: Rgb888,
}

impl Layout {
    #[must_use]
    pub fn from_config(config: &DisplayConfig) -> Self {
        let [r, g, b] = config.text_color;
        Layout {
            text_color: Rgb888::new(r, g, b),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            text_color: Rgb888::new(255, 255, 255),
        }
    }
}

/// Everything a frame depends on. Equal views always render equal frames.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    pub snapshot: &'a Snapshot,
    pub status: &'a FeedStatus,
    pub page: usize,
}

#[must_use]
pub fn page_count(flights: usize) -> usize {
    flights.div_ceil(FLIGHT_ROWS_PER_PAGE).max(1)
}

/// Highest first, ties broken by callsign then address so the order is stable.
#[must_use]
pub fn ordered_flights(snapshot: &Snapshot) -> Vec<&FlightRecord> {
    let mut flights: Vec<&FlightRecord> = snapshot.records().iter().collect();
    flights.sort_by(|a, b| {
        b.altitude_ft
            .total_cmp(&a.altitude_ft)
            .then_with(|| a.callsign.cmp(&b.callsign))
            .then_with(|| a.icao_address.cmp(&b.icao_address))
    });
    flights
}

#[must_use]
pub fn format_callsign(record: &FlightRecord) -> String {
    let callsign: String = record.callsign.chars().take(CALLSIGN_CHARS).collect();
    format!("{callsign:<width$}", width = CALLSIGN_CHARS)
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_altitude(record: &FlightRecord) -> String {
    let feet = record.altitude_ft.clamp(0.0, MAX_ALTITUDE_FT) as u32;
    format!("{feet:>5}ft")
}

#[must_use]
pub fn format_flight_row(record: &FlightRecord) -> String {
    format!("{} {}", format_callsign(record), format_altitude(record))
}

#[must_use]
pub fn status_line(view: &BoardView) -> String {
    let time = view
        .snapshot
        .observed_at()
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_default();
    let line = match view.status {
        FeedStatus::Waiting => String::from("WAITING"),
        FeedStatus::Live => {
            let pages = page_count(view.snapshot.len());
            let count = if view.snapshot.len() > MAX_SHOWN_COUNT {
                format!("{MAX_SHOWN_COUNT}+")
            } else {
                format!("{}AC", view.snapshot.len())
            };
            let page = if pages > MAX_SHOWN_PAGES {
                (view.page % pages + 1).to_string()
            } else if pages > 1 {
                format!("{}/{pages}", view.page % pages + 1)
            } else {
                String::new()
            };
            format!("{count:<5}{page:^5}{time:>5}")
        }
        FeedStatus::Stale { .. } => format!("{:<10}{time:>5}", "API ERR"),
    };
    line.trim_end().to_string()
}

fn altitude_color(altitude_ft: f64) -> Rgb888 {
    if altitude_ft < LOW_ALTITUDE_FT {
        LOW_ALTITUDE_COLOR
    } else if altitude_ft < MID_ALTITUDE_FT {
        MID_ALTITUDE_COLOR
    } else {
        HIGH_ALTITUDE_COLOR
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn line_top(line: usize) -> i32 {
    TEXT_TOP + line as i32 * LINE_HEIGHT
}

fn draw_text(frame: &mut MatrixFrame, text: &str, column: i32, line: usize, color: Rgb888) {
    let style = MonoTextStyle::new(&FONT_4X6, color);
    let origin = Point::new(TEXT_LEFT + column * GLYPH_WIDTH, line_top(line));
    match Text::with_baseline(text, origin, style, Baseline::Top).draw(frame) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_centered(frame: &mut MatrixFrame, text: &str, line: usize, color: Rgb888) {
    let width = text.chars().count() as i32 * GLYPH_WIDTH;
    let left = (MATRIX_WIDTH as i32 - width).max(0) / 2;
    let style = MonoTextStyle::new(&FONT_4X6, color);
    match Text::with_baseline(text, Point::new(left, line_top(line)), style, Baseline::Top)
        .draw(frame)
    {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

/// Lays out one page of the board onto a fresh 64x64 frame.
#[must_use]
pub fn render(view: &BoardView, layout: &Layout) -> MatrixFrame {
    let mut frame = MatrixFrame::new();

    if view.snapshot.is_empty() {
        match view.status {
            FeedStatus::Live => {
                draw_centered(&mut frame, "No flights", 3, layout.text_color);
                draw_centered(&mut frame, "in area", 4, layout.text_color);
            }
            FeedStatus::Waiting => draw_centered(&mut frame, "Waiting", 3, layout.text_color),
            FeedStatus::Stale { .. } => draw_centered(&mut frame, "API Error", 3, ERROR_COLOR),
        }
    } else {
        let flights = ordered_flights(view.snapshot);
        let page = view.page % page_count(flights.len());
        let visible = flights
            .iter()
            .skip(page * FLIGHT_ROWS_PER_PAGE)
            .take(FLIGHT_ROWS_PER_PAGE);
        for (line, record) in visible.enumerate() {
            draw_text(&mut frame, &format_callsign(record), 0, line, layout.text_color);
            draw_text(
                &mut frame,
                &format_altitude(record),
                ALTITUDE_COLUMN,
                line,
                altitude_color(record.altitude_ft),
            );
        }
    }

    let status_color = match view.status {
        FeedStatus::Stale { .. } => ERROR_COLOR,
        FeedStatus::Waiting | FeedStatus::Live => STATUS_COLOR,
    };
    draw_text(&mut frame, &status_line(view), 0, STATUS_LINE, status_color);

    frame
}
