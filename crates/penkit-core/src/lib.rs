//! # penkit core
//!
//! Types shared by every penkit crate: geometry primitives, SVG length
//! units, the error hierarchy and the event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod units;

pub use error::{Error, OutputError, ProcessingError, Result, ValidationError};

pub use event_bus::{
    AppEvent, ConversionEvent, ErrorEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    GcodeEvent, SettingsEvent, SubscriptionId,
};

pub use geometry::{BoundingBox, Path, Point, Polyline, Segment};
pub use units::{Length, LengthUnit, MM_PER_PX};
