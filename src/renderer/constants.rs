use embedded_graphics::pixelcolor::Rgb888;

pub const GLYPH_WIDTH: i32 = 4;
pub const LINE_HEIGHT: i32 = 7; // 6px glyph + 1px spacing
pub const TEXT_LEFT: i32 = 1;
pub const TEXT_TOP: i32 = 1;

pub const FLIGHT_ROWS_PER_PAGE: usize = 8;
pub const STATUS_LINE: usize = 8;
pub const CALLSIGN_CHARS: usize = 7;
pub const MAX_ALTITUDE_FT: f64 = 99_999.0;

// Status line columns are five glyphs wide
pub const MAX_SHOWN_COUNT: usize = 999;
pub const MAX_SHOWN_PAGES: usize = 99;

// Altitude column starts after "CALLSIG "
pub const ALTITUDE_COLUMN: i32 = 8;

pub const LOW_ALTITUDE_FT: f64 = 10_000.0;
pub const MID_ALTITUDE_FT: f64 = 25_000.0;

pub const LOW_ALTITUDE_COLOR: Rgb888 = Rgb888::new(0, 255, 0);
pub const MID_ALTITUDE_COLOR: Rgb888 = Rgb888::new(255, 200, 0);
pub const HIGH_ALTITUDE_COLOR: Rgb888 = Rgb888::new(0, 200, 255);
pub const STATUS_COLOR: Rgb888 = Rgb888::new(96, 96, 96);
pub const ERROR_COLOR: Rgb888 = Rgb888::new(255, 0, 0);
