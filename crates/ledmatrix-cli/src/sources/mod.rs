//! Frame sources the authoring tool can encode.

pub mod clock;
pub mod effects;
pub mod gif;
pub mod images;
pub mod raster;
pub mod text;

pub use clock::ClockFaceSource;
pub use effects::{EffectKind, EffectSource, EffectTunables};
pub use gif::GifOptions;
pub use raster::PixelStyle;
