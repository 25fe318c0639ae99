//! Circular geofence around the city centre
//!
//! Owns the boundary ring on the map (a source plus fill, line and optional
//! label layers) and the "come to the area" prompt sequence.

use crate::{
    animation::tweening::Tween,
    core::{
        camera::CameraOptions,
        config::{BoundaryConfig, ViewConfig},
        constants::{
            BOUNDARY_COLOR, BOUNDARY_FADE_DURATION, BOUNDARY_FILL_LAYER_ID,
            BOUNDARY_FILL_OPACITY, BOUNDARY_HIGHLIGHT_DURATION, BOUNDARY_HIGHLIGHT_LINE_WIDTH,
            BOUNDARY_HIGHLIGHT_OPACITY, BOUNDARY_LABEL_LAYER_ID, BOUNDARY_LINE_LAYER_ID,
            BOUNDARY_LINE_WIDTH, BOUNDARY_OVERVIEW_ZOOM, BOUNDARY_SOURCE_ID, CIRCLE_SEGMENTS,
            PROMPT_HIDE_BOUNDARY_DELAY, PROMPT_SETTLE_DELAY,
        },
        geo::{generate_circle, GeoPoint},
    },
    data::geojson::GeoJsonFeature,
    layers::base::{LayerSpec, LayerType, Visibility},
    plugins::base::PluginTrait,
    runtime::{Deferred, TimerQueue},
    traits::{MapHost, UiSurface},
    ui::popup::{PopupManager, PromptId},
    Result,
};
use instant::Instant;
use once_cell::unsync::OnceCell;
use serde_json::{json, Value};

const BOUNDARY_LAYER_IDS: [&str; 3] = [
    BOUNDARY_FILL_LAYER_ID,
    BOUNDARY_LINE_LAYER_ID,
    BOUNDARY_LABEL_LAYER_ID,
];

/// Fill opacity ramp in progress
#[derive(Debug, Clone)]
struct FillFade {
    tween: Tween<f64>,
    /// Hide the layers once the ramp reaches zero
    hide_when_done: bool,
}

#[derive(Debug)]
pub struct BoundaryGate {
    config: BoundaryConfig,
    view: ViewConfig,
    ring: OnceCell<Vec<GeoPoint>>,
    fade: Option<FillFade>,
    visible: bool,
    highlighted: bool,
}

impl BoundaryGate {
    pub fn new(config: BoundaryConfig, view: ViewConfig) -> Self {
        Self {
            config,
            view,
            ring: OnceCell::new(),
            fade: None,
            visible: false,
            highlighted: false,
        }
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    pub fn center(&self) -> GeoPoint {
        self.config.center
    }

    /// Inclusive: a point exactly on the radius is inside.
    pub fn is_within_boundary(&self, point: GeoPoint) -> bool {
        self.config.center.distance_km(&point) <= self.config.radius_km
    }

    /// The closed ring drawn on the map, computed once
    pub fn ring(&self) -> &[GeoPoint] {
        self.ring.get_or_init(|| {
            generate_circle(self.config.center, self.config.radius_m(), CIRCLE_SEGMENTS)
        })
    }

    pub fn boundary_feature(&self) -> GeoJsonFeature {
        GeoJsonFeature::polygon(self.ring().to_vec())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_animating(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Adds the boundary source and its hidden layers. Skipped when the
    /// source is already on the style.
    pub fn install(&self, map: &mut dyn MapHost) -> Result<()> {
        if map.has_source(BOUNDARY_SOURCE_ID) {
            log::debug!("boundary source already present");
            return Ok(());
        }

        map.add_source(BOUNDARY_SOURCE_ID, self.boundary_feature().into())?;
        map.add_layer(
            LayerSpec::new(BOUNDARY_FILL_LAYER_ID, LayerType::Fill, BOUNDARY_SOURCE_ID)
                .paint("fill-color", BOUNDARY_COLOR)
                .paint("fill-opacity", BOUNDARY_FILL_OPACITY)
                .visibility(Visibility::Hidden),
        )?;
        map.add_layer(
            LayerSpec::new(BOUNDARY_LINE_LAYER_ID, LayerType::Line, BOUNDARY_SOURCE_ID)
                .paint("line-color", BOUNDARY_COLOR)
                .paint("line-width", BOUNDARY_LINE_WIDTH)
                .paint("line-dasharray", json!([3, 3]))
                .visibility(Visibility::Hidden),
        )?;
        log::info!(
            "boundary installed: {:?}, {} km",
            self.config.center,
            self.config.radius_km
        );
        Ok(())
    }

    /// Makes the boundary visible and ramps the fill in from zero
    pub fn show_visual(&mut self, map: &mut dyn MapHost, now: Instant) {
        for layer_id in BOUNDARY_LAYER_IDS {
            if !map.has_layer(layer_id) {
                log::warn!("boundary layer {} not found, cannot show it", layer_id);
                continue;
            }
            set_layout(map, layer_id, "visibility", Visibility::Visible.to_value());

            if layer_id == BOUNDARY_FILL_LAYER_ID {
                set_paint(map, layer_id, "fill-opacity", Value::from(0.0));
                self.fade = Some(FillFade {
                    tween: Tween::new(0.0, BOUNDARY_FILL_OPACITY, BOUNDARY_FADE_DURATION, now),
                    hide_when_done: false,
                });
            }
        }
        self.visible = true;
    }

    /// Ramps the fill out from its current opacity, then hides every layer
    pub fn hide_visual(&mut self, map: &mut dyn MapHost, now: Instant) {
        self.visible = false;
        for layer_id in BOUNDARY_LAYER_IDS {
            if !map.has_layer(layer_id) {
                log::warn!("boundary layer {} not found, cannot hide it", layer_id);
                continue;
            }
            if layer_id != BOUNDARY_FILL_LAYER_ID {
                set_layout(map, layer_id, "visibility", Visibility::Hidden.to_value());
                continue;
            }

            let current = map
                .paint_property(layer_id, "fill-opacity")
                .and_then(|v| v.as_f64())
                .unwrap_or(BOUNDARY_FILL_OPACITY);
            if current <= 0.0 {
                self.fade = None;
                set_layout(map, layer_id, "visibility", Visibility::Hidden.to_value());
                continue;
            }
            // Same rate as the fade-in, whatever the starting opacity
            let duration = BOUNDARY_FADE_DURATION.mul_f64(current / BOUNDARY_FILL_OPACITY);
            self.fade = Some(FillFade {
                tween: Tween::new(current, 0.0, duration, now),
                hide_when_done: true,
            });
        }
    }

    /// Advances the fill ramp. Returns whether it is still running.
    pub fn animate(&mut self, map: &mut dyn MapHost, now: Instant) -> bool {
        let Some(fade) = &self.fade else {
            return false;
        };
        if !map.has_layer(BOUNDARY_FILL_LAYER_ID) {
            log::debug!("boundary fill vanished mid-animation");
            self.fade = None;
            return false;
        }

        set_paint(
            map,
            BOUNDARY_FILL_LAYER_ID,
            "fill-opacity",
            Value::from(fade.tween.value_at(now)),
        );
        if !fade.tween.is_finished_at(now) {
            return true;
        }

        if fade.hide_when_done {
            set_layout(
                map,
                BOUNDARY_FILL_LAYER_ID,
                "visibility",
                Visibility::Hidden.to_value(),
            );
        }
        self.fade = None;
        false
    }

    /// Shows the prompt, highlights the ring and brings the whole area into
    /// view. Replaces any prompt already on the page.
    pub fn present_prompt(
        &mut self,
        map: &mut dyn MapHost,
        ui: &mut dyn UiSurface,
        popups: &mut PopupManager,
        timers: &mut TimerQueue,
        now: Instant,
    ) -> PromptId {
        let id = popups.present_prompt(ui);
        log::info!("boundary prompt {:?} shown", id);

        if map.has_layer(BOUNDARY_FILL_LAYER_ID) {
            // The highlight wins over a fade-in started in the same turn
            if matches!(&self.fade, Some(fade) if !fade.hide_when_done) {
                self.fade = None;
            }
            set_paint(
                map,
                BOUNDARY_FILL_LAYER_ID,
                "fill-opacity",
                Value::from(BOUNDARY_HIGHLIGHT_OPACITY),
            );
            if map.has_layer(BOUNDARY_LINE_LAYER_ID) {
                set_paint(
                    map,
                    BOUNDARY_LINE_LAYER_ID,
                    "line-width",
                    Value::from(BOUNDARY_HIGHLIGHT_LINE_WIDTH),
                );
            }
            self.highlighted = true;
            timers.schedule_after(
                now,
                BOUNDARY_HIGHLIGHT_DURATION,
                Deferred::ResetBoundaryHighlight(id),
            );
        } else {
            log::warn!("boundary layers not found, prompt shown without highlight");
        }

        if map.is_moving() || map.is_easing() {
            log::debug!("camera busy, not flying to the boundary");
        } else {
            map.fly_to(self.overview_camera());
        }
        id
    }

    /// Starts closing the prompt: hide the ring, remove the prompt once its
    /// exit animation settled, and return to the intro view.
    pub fn acknowledge_prompt(
        &mut self,
        map: &mut dyn MapHost,
        ui: &mut dyn UiSurface,
        popups: &mut PopupManager,
        timers: &mut TimerQueue,
        now: Instant,
    ) -> Option<PromptId> {
        let Some(id) = popups.acknowledge_prompt(ui) else {
            log::debug!("no boundary prompt to acknowledge");
            return None;
        };

        timers.schedule_after(now, PROMPT_HIDE_BOUNDARY_DELAY, Deferred::HideBoundary(id));
        timers.schedule_after(now, PROMPT_SETTLE_DELAY, Deferred::RemovePrompt(id));
        map.fly_to(self.view.intro_camera(ui.is_compact_layout()));
        Some(id)
    }

    /// Puts fill and outline back to their resting style, if still present
    pub fn reset_highlight(&mut self, map: &mut dyn MapHost) {
        self.highlighted = false;
        if map.has_layer(BOUNDARY_FILL_LAYER_ID) && self.fade.is_none() {
            set_paint(
                map,
                BOUNDARY_FILL_LAYER_ID,
                "fill-opacity",
                Value::from(BOUNDARY_FILL_OPACITY),
            );
        }
        if map.has_layer(BOUNDARY_LINE_LAYER_ID) {
            set_paint(
                map,
                BOUNDARY_LINE_LAYER_ID,
                "line-width",
                Value::from(BOUNDARY_LINE_WIDTH),
            );
        }
    }

    /// Wide, top-down view of the whole boundary
    pub fn overview_camera(&self) -> CameraOptions {
        CameraOptions::new()
            .center(self.config.center)
            .zoom(BOUNDARY_OVERVIEW_ZOOM)
            .pitch(0.0)
            .bearing(0.0)
            .duration_ms(1500)
    }
}

impl PluginTrait for BoundaryGate {
    fn name(&self) -> &str {
        "boundary"
    }

    fn on_style_loaded(&mut self, map: &mut dyn MapHost) -> Result<()> {
        // A reloaded style lost whatever the ramp was driving
        self.fade = None;
        self.install(map)
    }

    fn on_idle(&mut self, map: &mut dyn MapHost) -> Result<()> {
        self.install(map)
    }

    fn on_remove(&mut self, map: &mut dyn MapHost) -> Result<()> {
        self.fade = None;
        for layer_id in BOUNDARY_LAYER_IDS {
            if map.has_layer(layer_id) {
                map.set_layout_property(layer_id, "visibility", Visibility::Hidden.to_value())?;
            }
        }
        self.visible = false;
        Ok(())
    }
}

fn set_paint(map: &mut dyn MapHost, layer_id: &str, name: &str, value: Value) {
    if let Err(e) = map.set_paint_property(layer_id, name, value) {
        log::warn!("failed to set {} on {}: {}", name, layer_id, e);
    }
}

fn set_layout(map: &mut dyn MapHost, layer_id: &str, name: &str, value: Value) {
    if let Err(e) = map.set_layout_property(layer_id, name, value) {
        log::warn!("failed to set {} on {}: {}", name, layer_id, e);
    }
}
