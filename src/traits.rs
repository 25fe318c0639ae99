//! Collaborator interfaces
//!
//! The map engine, its built-in geolocate control and the page UI are black
//! boxes to this crate. Everything the subsystem needs from them goes through
//! the traits below, so the same logic runs against the browser, the headless
//! recorder, or a test double.

use crate::{
    core::{camera::CameraOptions, geo::GeoPoint},
    data::geojson::GeoJson,
    layers::{base::LayerSpec, marker::DistanceMarker},
    plugins::geolocate::TrackingState,
    ui::popup::{BoundaryPrompt, NotificationId, PromptId},
    Result,
};
use serde_json::Value;
use std::collections::BTreeSet;

/// The map rendering engine.
///
/// Style mutations return `Err(MapError::MissingLayer | MissingSource)` when
/// the target does not exist, which happens whenever the style reloads.
/// Callers check existence first and treat a miss as a logged no-op.
pub trait MapHost {
    fn is_moving(&self) -> bool;

    fn is_easing(&self) -> bool;

    /// Current camera center
    fn center(&self) -> GeoPoint;

    /// Current camera pitch in degrees
    fn pitch(&self) -> f64;

    fn fly_to(&mut self, options: CameraOptions);

    fn ease_to(&mut self, options: CameraOptions);

    fn has_layer(&self, layer_id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()>;

    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;

    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;

    fn paint_property(&self, layer_id: &str, name: &str) -> Option<Value>;

    /// Replaces the filter of a layer. `None` removes it, showing every feature.
    fn set_filter(&mut self, layer_id: &str, filter: Option<Value>) -> Result<()>;

    fn has_source(&self, source_id: &str) -> bool;

    fn add_source(&mut self, source_id: &str, data: GeoJson) -> Result<()>;

    fn set_source_data(&mut self, source_id: &str, data: GeoJson) -> Result<()>;

    /// Adds an HTML marker to the map
    fn add_marker(&mut self, marker: &DistanceMarker);

    fn remove_marker(&mut self, marker_id: &str);
}

/// The map engine's built-in location tracking control.
///
/// Only its observable state is used: the controller reads and overrides the
/// watch state and cleans up the control's visuals, it never replaces the
/// control's own handlers.
pub trait LocationControl {
    fn watch_state(&self) -> TrackingState;

    fn set_watch_state(&mut self, state: TrackingState);

    /// Removes the user location dot if the control added one
    fn remove_user_marker(&mut self);

    /// Clears the active/waiting styling of the locate button
    fn reset_button(&mut self);
}

/// The page around the map: prompts, notifications and filter buttons.
pub trait UiSurface {
    fn show_prompt(&mut self, prompt: &BoundaryPrompt);

    /// Starts the exit animation of a prompt
    fn dismiss_prompt(&mut self, id: PromptId);

    /// Removes a prompt from the page
    fn remove_prompt(&mut self, id: PromptId);

    fn show_notification(&mut self, id: NotificationId, message: &str);

    fn remove_notification(&mut self, id: NotificationId);

    /// Marks exactly the buttons of `active` categories as active
    fn sync_filter_buttons(&mut self, active: &BTreeSet<String>);

    /// Phone-sized layout
    fn is_compact_layout(&self) -> bool {
        false
    }
}
