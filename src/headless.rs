//! In-memory collaborators that record what the subsystem asks of them
//!
//! Used by the tests and by `mapgate-replay`. The map applies camera commands
//! instantly and keeps style state (layers, sources, filters, markers) the way
//! the engine would, returning `MissingLayer` / `MissingSource` for unknown ids.

use crate::{
    core::{camera::CameraOptions, geo::GeoPoint},
    data::geojson::GeoJson,
    layers::{
        base::{LayerSpec, LayerType},
        marker::DistanceMarker,
    },
    plugins::geolocate::TrackingState,
    prelude::HashMap,
    traits::{LocationControl, MapHost, UiSurface},
    ui::popup::{BoundaryPrompt, NotificationId, PromptId},
    MapError, Result,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// A mutating call made on [`HeadlessMap`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MapCommand {
    FlyTo(CameraOptions),
    EaseTo(CameraOptions),
    AddSource { id: String },
    SetSourceData { id: String },
    AddLayer { id: String },
    SetLayout { layer: String, name: String, value: Value },
    SetPaint { layer: String, name: String, value: Value },
    SetFilter { layer: String, filter: Option<Value> },
    AddMarker { id: String, label: String },
    RemoveMarker { id: String },
}

impl MapCommand {
    pub fn is_camera(&self) -> bool {
        matches!(self, MapCommand::FlyTo(_) | MapCommand::EaseTo(_))
    }
}

#[derive(Debug)]
pub struct HeadlessMap {
    layers: HashMap<String, LayerSpec>,
    filters: HashMap<String, Value>,
    sources: HashMap<String, GeoJson>,
    markers: Vec<DistanceMarker>,
    commands: Vec<MapCommand>,
    center: GeoPoint,
    pitch: f64,
    moving: bool,
    easing: bool,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self {
            layers: HashMap::default(),
            filters: HashMap::default(),
            sources: HashMap::default(),
            markers: Vec::new(),
            commands: Vec::new(),
            center: GeoPoint::default(),
            pitch: 0.0,
            moving: false,
            easing: false,
        }
    }
}

impl HeadlessMap {
    /// A map whose style already carries the given layers, like the
    /// CMS-driven location layers
    pub fn with_layers(ids: &[&str]) -> Self {
        let mut map = Self::default();
        for id in ids {
            map.add_style_layer(id);
        }
        map
    }

    pub fn add_style_layer(&mut self, id: &str) {
        self.layers.insert(
            id.to_string(),
            LayerSpec::new(id, LayerType::Symbol, "locations"),
        );
    }

    /// Drops every layer, source and filter, as a style reload does
    pub fn reload_style(&mut self) {
        self.layers.clear();
        self.sources.clear();
        self.filters.clear();
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
    }

    pub fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch;
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    pub fn set_easing(&mut self, easing: bool) {
        self.easing = easing;
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn camera_commands(&self) -> Vec<MapCommand> {
        self.commands
            .iter()
            .filter(|c| c.is_camera())
            .cloned()
            .collect()
    }

    pub fn layout_property(&self, layer_id: &str, name: &str) -> Option<Value> {
        self.layers.get(layer_id)?.layout.get(name).cloned()
    }

    pub fn filter(&self, layer_id: &str) -> Option<Value> {
        self.filters.get(layer_id).cloned()
    }

    pub fn source_data(&self, source_id: &str) -> Option<&GeoJson> {
        self.sources.get(source_id)
    }

    pub fn marker_ids(&self) -> Vec<String> {
        self.markers.iter().map(|m| m.id.clone()).collect()
    }

    fn apply_camera(&mut self, options: &CameraOptions) {
        if let Some(center) = options.center {
            self.center = center;
        }
        if let Some(pitch) = options.pitch {
            self.pitch = pitch;
        }
    }

    fn layer_mut(&mut self, layer_id: &str) -> Result<&mut LayerSpec> {
        self.layers
            .get_mut(layer_id)
            .ok_or_else(|| MapError::MissingLayer(layer_id.to_string()))
    }
}

impl MapHost for HeadlessMap {
    fn is_moving(&self) -> bool {
        self.moving
    }

    fn is_easing(&self) -> bool {
        self.easing
    }

    fn center(&self) -> GeoPoint {
        self.center
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn fly_to(&mut self, options: CameraOptions) {
        self.apply_camera(&options);
        self.commands.push(MapCommand::FlyTo(options));
    }

    fn ease_to(&mut self, options: CameraOptions) {
        self.apply_camera(&options);
        self.commands.push(MapCommand::EaseTo(options));
    }

    fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::MissingSource(layer.source));
        }
        self.commands.push(MapCommand::AddLayer {
            id: layer.id.clone(),
        });
        self.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        self.layer_mut(layer_id)?
            .layout
            .insert(name.to_string(), value.clone());
        self.commands.push(MapCommand::SetLayout {
            layer: layer_id.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        self.layer_mut(layer_id)?
            .paint
            .insert(name.to_string(), value.clone());
        self.commands.push(MapCommand::SetPaint {
            layer: layer_id.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn paint_property(&self, layer_id: &str, name: &str) -> Option<Value> {
        self.layers.get(layer_id)?.paint.get(name).cloned()
    }

    fn set_filter(&mut self, layer_id: &str, filter: Option<Value>) -> Result<()> {
        if !self.layers.contains_key(layer_id) {
            return Err(MapError::MissingLayer(layer_id.to_string()));
        }
        match &filter {
            Some(value) => {
                self.filters.insert(layer_id.to_string(), value.clone());
            }
            None => {
                self.filters.remove(layer_id);
            }
        }
        self.commands.push(MapCommand::SetFilter {
            layer: layer_id.to_string(),
            filter,
        });
        Ok(())
    }

    fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    fn add_source(&mut self, source_id: &str, data: GeoJson) -> Result<()> {
        self.sources.insert(source_id.to_string(), data);
        self.commands.push(MapCommand::AddSource {
            id: source_id.to_string(),
        });
        Ok(())
    }

    fn set_source_data(&mut self, source_id: &str, data: GeoJson) -> Result<()> {
        let source = self
            .sources
            .get_mut(source_id)
            .ok_or_else(|| MapError::MissingSource(source_id.to_string()))?;
        *source = data;
        self.commands.push(MapCommand::SetSourceData {
            id: source_id.to_string(),
        });
        Ok(())
    }

    fn add_marker(&mut self, marker: &DistanceMarker) {
        self.commands.push(MapCommand::AddMarker {
            id: marker.id.clone(),
            label: marker.label.clone(),
        });
        self.markers.push(marker.clone());
    }

    fn remove_marker(&mut self, marker_id: &str) {
        self.markers.retain(|m| m.id != marker_id);
        self.commands.push(MapCommand::RemoveMarker {
            id: marker_id.to_string(),
        });
    }
}

/// Location control double. The host flips its state when tracking starts;
/// everything the controller overrides is recorded.
#[derive(Debug, Default)]
pub struct HeadlessLocationControl {
    state: TrackingState,
    state_changes: Vec<TrackingState>,
    user_marker_removals: usize,
    button_resets: usize,
}

impl HeadlessLocationControl {
    /// State change made by the control itself, e.g. when the user starts
    /// tracking
    pub fn begin_tracking(&mut self) {
        self.state = TrackingState::ActiveLock;
    }

    pub fn state_changes(&self) -> &[TrackingState] {
        &self.state_changes
    }

    pub fn user_marker_removed(&self) -> bool {
        self.user_marker_removals > 0
    }

    pub fn button_resets(&self) -> usize {
        self.button_resets
    }
}

impl LocationControl for HeadlessLocationControl {
    fn watch_state(&self) -> TrackingState {
        self.state
    }

    fn set_watch_state(&mut self, state: TrackingState) {
        self.state = state;
        self.state_changes.push(state);
    }

    fn remove_user_marker(&mut self) {
        self.user_marker_removals += 1;
    }

    fn reset_button(&mut self) {
        self.button_resets += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum UiCommand {
    ShowPrompt(PromptId),
    DismissPrompt(PromptId),
    RemovePrompt(PromptId),
    ShowNotification { id: NotificationId, message: String },
    RemoveNotification(NotificationId),
    SyncFilterButtons { active: Vec<String> },
}

#[derive(Debug, Default)]
pub struct HeadlessUi {
    commands: Vec<UiCommand>,
    prompts: Vec<PromptId>,
    notifications: Vec<(NotificationId, String)>,
    active_buttons: BTreeSet<String>,
    compact: bool,
}

impl HeadlessUi {
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[UiCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<UiCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Prompts currently on the page, including ones mid exit animation
    pub fn visible_prompts(&self) -> Vec<PromptId> {
        self.prompts.clone()
    }

    /// How many prompts were ever shown
    pub fn prompts_shown(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, UiCommand::ShowPrompt(_)))
            .count()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn active_buttons(&self) -> BTreeSet<String> {
        self.active_buttons.clone()
    }
}

impl UiSurface for HeadlessUi {
    fn show_prompt(&mut self, prompt: &BoundaryPrompt) {
        self.prompts.push(prompt.id);
        self.commands.push(UiCommand::ShowPrompt(prompt.id));
    }

    fn dismiss_prompt(&mut self, id: PromptId) {
        self.commands.push(UiCommand::DismissPrompt(id));
    }

    fn remove_prompt(&mut self, id: PromptId) {
        self.prompts.retain(|p| *p != id);
        self.commands.push(UiCommand::RemovePrompt(id));
    }

    fn show_notification(&mut self, id: NotificationId, message: &str) {
        self.notifications.push((id, message.to_string()));
        self.commands.push(UiCommand::ShowNotification {
            id,
            message: message.to_string(),
        });
    }

    fn remove_notification(&mut self, id: NotificationId) {
        self.notifications.retain(|(n, _)| *n != id);
        self.commands.push(UiCommand::RemoveNotification(id));
    }

    fn sync_filter_buttons(&mut self, active: &BTreeSet<String>) {
        self.active_buttons = active.clone();
        self.commands.push(UiCommand::SyncFilterButtons {
            active: active.iter().cloned().collect(),
        });
    }

    fn is_compact_layout(&self) -> bool {
        self.compact
    }
}
