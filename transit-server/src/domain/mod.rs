//! Domain types for the transit real-time server.
//!
//! Route points and the passages reported for them, plus the place and
//! mode types used by the fallback duration computation.

mod passage;
mod place;
mod route_point;

pub use passage::{InvalidDateTime, RealTimePassage, parse_iso_datetime};
pub use place::{InvalidMode, Mode, Place, PlaceUri};
pub use route_point::{ObjectCodes, RoutePoint};
