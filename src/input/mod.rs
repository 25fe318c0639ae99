pub mod events;

pub use events::{Coordinates, GeolocationError, LocationFix, MapEvent, PositionError};
