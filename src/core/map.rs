use crate::{
    core::{camera::CameraOptions, config::MapConfig, constants::MODELS_LAYER_ID, geo::GeoPoint},
    data::{
        filters::{ChangeOrigin, FilterStore},
        geojson::{points_of_interest, GeoJson, PointOfInterest},
        settings::PerformanceSettings,
        storage::{KeyValueStorage, StorageEvent},
    },
    input::events::{LocationFix, MapEvent, PositionError},
    layers::base::Visibility,
    plugins::{
        base::PluginTrait,
        boundary::BoundaryGate,
        geolocate::{
            FixOutcome, GeolocateContext, GeolocateHandler, GeolocationController, TrackingState,
        },
    },
    runtime::{Deferred, TimerQueue},
    traits::{LocationControl, MapHost, UiSurface},
    ui::popup::{PopupManager, PromptId, PromptPhase},
    Result,
};
use instant::Instant;
use std::rc::Rc;

/// The city map subsystem wired to its collaborators.
///
/// Owns every piece of mutable state (filters, geofence, tracking session,
/// prompts, pending timers, 3D preferences) and routes host events to them.
/// Constructed once per page; everything runs on the UI thread.
pub struct CityMap<M: MapHost, L: LocationControl, U: UiSurface> {
    config: MapConfig,
    map: M,
    control: L,
    ui: U,
    storage: Rc<dyn KeyValueStorage>,
    filters: FilterStore,
    gate: BoundaryGate,
    geolocation: GeolocationController,
    popups: PopupManager,
    timers: TimerQueue,
    performance: PerformanceSettings,
    style_loaded: bool,
}

impl<M: MapHost, L: LocationControl, U: UiSurface> CityMap<M, L, U> {
    pub fn new(
        config: MapConfig,
        map: M,
        control: L,
        ui: U,
        storage: Rc<dyn KeyValueStorage>,
    ) -> Result<Self> {
        config.validate()?;

        let filters = FilterStore::load(storage.clone(), &config.filters);
        let performance =
            PerformanceSettings::load(storage.as_ref(), &config.performance_storage_key);
        let gate = BoundaryGate::new(config.boundary.clone(), config.view.clone());
        log::info!(
            "city map ready: {} active filters, 3D {}",
            filters.active_categories().len(),
            if performance.is_3d_enabled { "on" } else { "off" }
        );

        Ok(Self {
            config,
            map,
            control,
            ui,
            storage,
            filters,
            gate,
            geolocation: GeolocationController::new(),
            popups: PopupManager::new(),
            timers: TimerQueue::new(),
            performance,
            style_loaded: false,
        })
    }

    /// Routes one host event. Only a failed style installation is reported;
    /// everything else degrades to a logged no-op.
    pub fn handle(&mut self, event: MapEvent, now: Instant) -> Result<()> {
        log::trace!("event {:?}", event);
        match event {
            MapEvent::StyleLoaded => self.on_style_loaded()?,
            MapEvent::Idle => self.on_idle(),
            MapEvent::LocateButtonClicked => {
                self.geolocation.on_locate_button_clicked(&mut self.map, &mut self.gate, now);
            }
            MapEvent::LocationResolved(fix) => {
                self.on_location_resolved(&fix, now);
            }
            MapEvent::LocationError(error) => self.on_location_error(&error, now),
            MapEvent::TrackingStarted => {
                self.geolocation.on_tracking_started(
                    &mut self.map,
                    &mut self.control,
                    &mut self.gate,
                    now,
                );
            }
            MapEvent::TrackingEnded => self.geolocation.on_tracking_ended(&mut self.map),
            MapEvent::PopupOpened => self.geolocation.set_popup_open(true, &mut self.control),
            MapEvent::PopupClosed => self.geolocation.set_popup_open(false, &mut self.control),
            MapEvent::PromptAcknowledged => {
                self.gate.acknowledge_prompt(
                    &mut self.map,
                    &mut self.ui,
                    &mut self.popups,
                    &mut self.timers,
                    now,
                );
            }
            MapEvent::FilterButtonClicked { category } => self.toggle_category(&category),
            MapEvent::StorageChanged(change) => self.on_storage_changed(&change),
            MapEvent::Toggle3d { enabled } => self.set_3d_enabled(enabled),
        }
        Ok(())
    }

    /// Advances animations and runs due timers. Returns whether anything is
    /// still pending, so the host knows to keep calling.
    pub fn tick(&mut self, now: Instant) -> bool {
        let animating = self.gate.animate(&mut self.map, now);

        for task in self.timers.drain_due(now) {
            log::trace!("running deferred {:?}", task);
            match task {
                Deferred::ResetBoundaryHighlight(id) => {
                    if self.popups.active_prompt().map_or(true, |active| active == id) {
                        self.gate.reset_highlight(&mut self.map);
                    }
                }
                Deferred::HideBoundary(id) => {
                    let dismissing = self.popups.active_prompt() == Some(id)
                        && self.popups.prompt_phase() == Some(PromptPhase::Dismissing);
                    if dismissing {
                        self.gate.hide_visual(&mut self.map, now);
                    } else {
                        log::debug!("prompt {:?} replaced, boundary stays visible", id);
                    }
                }
                Deferred::RemovePrompt(id) => self.popups.remove_prompt(id, &mut self.ui),
                Deferred::RemoveNotification(id) => {
                    self.popups.expire_notification(id, &mut self.ui)
                }
            }
        }

        animating || self.gate.is_animating() || !self.timers.is_empty()
    }

    pub fn on_location_resolved(&mut self, fix: &LocationFix, now: Instant) -> FixOutcome {
        let mut cx = GeolocateContext {
            map: &mut self.map,
            control: &mut self.control,
            ui: &mut self.ui,
            gate: &mut self.gate,
            popups: &mut self.popups,
            timers: &mut self.timers,
            now,
        };
        self.geolocation.on_fix_resolved(fix, &mut cx)
    }

    pub fn on_location_error(&mut self, error: &PositionError, now: Instant) {
        let mut cx = GeolocateContext {
            map: &mut self.map,
            control: &mut self.control,
            ui: &mut self.ui,
            gate: &mut self.gate,
            popups: &mut self.popups,
            timers: &mut self.timers,
            now,
        };
        self.geolocation.on_fix_failed(error, &mut cx);
    }

    fn on_style_loaded(&mut self) -> Result<()> {
        self.style_loaded = true;
        self.gate.on_style_loaded(&mut self.map)?;
        self.geolocation.on_style_loaded(&mut self.map)?;
        self.filters.sync(&mut self.map, &mut self.ui);
        self.apply_models_visibility();
        Ok(())
    }

    /// Retries whatever the style was not ready for earlier
    fn on_idle(&mut self) {
        if !self.style_loaded {
            return;
        }
        if let Err(e) = self.gate.on_idle(&mut self.map) {
            log::warn!("{} install retry failed: {}", self.gate.name(), e);
        }
        if let Err(e) = self.geolocation.on_idle(&mut self.map) {
            log::warn!("{} install retry failed: {}", self.geolocation.name(), e);
        }
        self.filters.apply_map_filters(&mut self.map);
    }

    fn on_storage_changed(&mut self, change: &StorageEvent) {
        if self.filters.on_storage_event(change, &mut self.map, &mut self.ui) {
            return;
        }
        if change.is_for(&self.config.performance_storage_key) {
            let key = &self.config.performance_storage_key;
            self.performance = PerformanceSettings::load(self.storage.as_ref(), key);
            self.apply_models_visibility();
        }
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.filters.toggle_category(category, &mut self.map, &mut self.ui);
    }

    pub fn set_active_categories<I>(&mut self, categories: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.filters.set_active_categories(
            categories,
            ChangeOrigin::Local,
            &mut self.map,
            &mut self.ui,
        );
    }

    pub fn is_within_boundary(&self, point: GeoPoint) -> bool {
        self.gate.is_within_boundary(point)
    }

    /// Shows the boundary prompt on behalf of another feature (e.g. AR links)
    pub fn present_boundary_prompt(&mut self, now: Instant) -> PromptId {
        self.gate.present_prompt(
            &mut self.map,
            &mut self.ui,
            &mut self.popups,
            &mut self.timers,
            now,
        )
    }

    pub fn pause_tracking(&mut self) {
        self.geolocation.pause_tracking(&mut self.control);
    }

    pub fn resume_tracking(&mut self) {
        self.geolocation.resume_tracking(&mut self.control);
    }

    pub fn set_points_of_interest(&mut self, pois: Vec<PointOfInterest>) {
        self.geolocation.set_points_of_interest(pois);
    }

    pub fn load_points_of_interest(&mut self, data: &GeoJson) {
        self.set_points_of_interest(points_of_interest(data));
    }

    /// Switches the 3D models on or off, tilting the camera flat while
    /// they are off and restoring the previous pitch afterwards.
    pub fn set_3d_enabled(&mut self, enabled: bool) {
        if self.performance.is_3d_enabled != enabled {
            if enabled {
                let pitch = self.performance.previous_pitch;
                self.map.ease_to(CameraOptions::new().pitch(pitch).duration_ms(500));
            } else {
                self.performance.previous_pitch = self.map.pitch();
                self.map.ease_to(CameraOptions::new().pitch(0.0).duration_ms(500));
            }
            self.performance.is_3d_enabled = enabled;
            log::info!("3D models {}", if enabled { "enabled" } else { "disabled" });

            if let Err(e) = self
                .performance
                .save(self.storage.as_ref(), &self.config.performance_storage_key)
            {
                log::error!("could not save performance settings: {}", e);
            }
        }
        self.apply_models_visibility();
    }

    fn apply_models_visibility(&mut self) {
        if !self.map.has_layer(MODELS_LAYER_ID) {
            log::debug!("no {} layer on this style", MODELS_LAYER_ID);
            return;
        }
        let visibility = if self.performance.is_3d_enabled {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        if let Err(e) =
            self.map
                .set_layout_property(MODELS_LAYER_ID, "visibility", visibility.to_value())
        {
            log::warn!("failed to toggle {}: {}", MODELS_LAYER_ID, e);
        }
    }

    /// Tears the subsystem down. Fixes and errors still in flight are ignored.
    pub fn detach(&mut self) {
        self.geolocation.detach();
        if let Err(e) = self.gate.on_remove(&mut self.map) {
            log::warn!("failed to remove boundary visuals: {}", e);
        }
        if let Err(e) = self.geolocation.on_remove(&mut self.map) {
            log::warn!("failed to remove location visuals: {}", e);
        }
        log::info!("city map detached");
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.geolocation.current_state()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn control(&self) -> &L {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut L {
        &mut self.control
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn gate(&self) -> &BoundaryGate {
        &self.gate
    }

    pub fn geolocation(&self) -> &GeolocationController {
        &self.geolocation
    }

    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    pub fn performance(&self) -> &PerformanceSettings {
        &self.performance
    }

    pub fn next_timer_due(&self) -> Option<Instant> {
        self.timers.next_due()
    }
}
