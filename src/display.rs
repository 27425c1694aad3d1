pub mod error;
pub mod terminal;

use crate::renderer::frame::MatrixFrame;
use error::RenderError;

pub use terminal::{TerminalBackend, TerminalStyle};

/// Output device for finished frames. A hardware matrix driver plugs in here.
pub trait MatrixBackend: Send + 'static {
    fn present(&mut self, frame: &MatrixFrame) -> Result<(), RenderError>;

    fn clear(&mut self) -> Result<(), RenderError>;
}
