pub mod base;
pub mod boundary;
pub mod geolocate;

pub use base::PluginTrait;
pub use boundary::BoundaryGate;
pub use geolocate::{
    FixOutcome, GeolocateContext, GeolocateHandler, GeolocationController, RejectTrigger,
    TrackingState,
};
