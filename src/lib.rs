pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod map;
pub mod surface;

pub use config::Config;
pub use error::{BlockError, ParseError, ParseErrorKind};
pub use map::{render, BlockCache, MapView, Viewport};
pub use surface::{Framebuffer, Rgb565, Surface};
