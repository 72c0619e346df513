//! LED Matrix Core Library
//!
//! Frame model, serpentine address mapping, delta encoding and the `.ani`
//! and `.iti` codecs for square addressable LED panels, plus the stencil
//! compositor and the strip sinks it draws into.

pub mod color;
pub mod compositor;
pub mod container;
pub mod delta;
pub mod error;
pub mod frame;
pub mod glyphs;
pub mod itinerary;
pub mod mapping;
pub mod overlay;
pub mod pipeline;
pub mod rotation;
pub mod strip;

pub use color::Rgb;
pub use container::{AnimationHeader, AnimationKind, AnimationReader, AnimationWriter, Fps};
pub use delta::DeltaRecord;
pub use error::{Error, Result};
pub use frame::Frame;
pub use itinerary::{Itinerary, ItineraryBuilder, ItineraryEntry};
pub use mapping::AddressMap;
pub use overlay::OverlayMatrix;
pub use pipeline::{encode_animation, EncodeMode, EncodeStats, FrameSource};
pub use rotation::Rotation;
pub use strip::{MemoryStrip, PixelSink, SerialStrip};

/// Panel side length the daemon and authoring tool assume by default.
pub const DEFAULT_SIDE_LENGTH: u16 = 16;

/// Default mounting rotation, in counter-clockwise quarter turns.
pub const DEFAULT_ROTATION: u8 = 3;

/// Seconds in the day an itinerary covers.
pub const DAY_SECONDS: u32 = 86_400;
