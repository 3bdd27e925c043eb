//! # Event Bus Module
//!
//! Fan-out publish/subscribe for conversion, program and settings events.
//!
//! ```rust
//! use penkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, GcodeEvent};
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Gcode]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.publish(AppEvent::Gcode(GcodeEvent::Rescaled {
//!     output: "drawing.gcode".into(),
//!     factor: 0.5,
//! }));
//!
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
