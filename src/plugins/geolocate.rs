//! Boundary-gated location tracking
//!
//! Sits between the map's built-in location control and the rest of the page.
//! The control keeps producing fixes and errors; this controller decides
//! whether a fix is accepted, and overrides the control's watch state when it
//! is not. The boundary is only enforced for requests the user started by
//! clicking the locate button, or when an active session drifts outside it.

use crate::{
    core::{
        camera::CameraOptions,
        constants::{
            CAMERA_FOLLOW_THRESHOLD_M, DISTANCE_MARKER_RADIUS_M, FIRST_FIX_ZOOM,
            NOTIFICATION_LIFETIME,
        },
        geo::GeoPoint,
    },
    data::geojson::PointOfInterest,
    input::events::{LocationFix, PositionError},
    layers::{marker::DistanceMarkerSet, radius::SearchRadius},
    plugins::{base::PluginTrait, boundary::BoundaryGate},
    runtime::{Deferred, TimerQueue},
    traits::{LocationControl, MapHost, UiSurface},
    ui::popup::PopupManager,
    Result,
};
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Watch state of the location control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingState {
    /// Not tracking, no user marker
    #[default]
    Off,
    /// Tracking, camera follows the user
    ActiveLock,
    /// Tracking, user marker shown, camera left alone
    ActiveError,
}

impl TrackingState {
    pub fn is_tracking(self) -> bool {
        self != TrackingState::Off
    }
}

/// Why a fix was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectTrigger {
    /// The user asked for their location from outside the boundary
    UserRequest,
    /// An active session moved outside the boundary
    Drift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    Accepted,
    Rejected(RejectTrigger),
    /// Background fix outside the boundary with tracking off, or the
    /// controller was detached
    Ignored,
}

/// Everything a location callback may touch, borrowed for one event
pub struct GeolocateContext<'a> {
    pub map: &'a mut dyn MapHost,
    pub control: &'a mut dyn LocationControl,
    pub ui: &'a mut dyn UiSurface,
    pub gate: &'a mut BoundaryGate,
    pub popups: &'a mut PopupManager,
    pub timers: &'a mut TimerQueue,
    pub now: Instant,
}

/// Callbacks the location control reports to.
///
/// Subscribed explicitly by the host instead of replacing the control's own
/// success handler.
pub trait GeolocateHandler {
    fn on_fix_resolved(&mut self, fix: &LocationFix, cx: &mut GeolocateContext<'_>) -> FixOutcome;

    fn on_fix_failed(&mut self, error: &PositionError, cx: &mut GeolocateContext<'_>);

    fn current_state(&self) -> TrackingState;
}

#[derive(Debug)]
pub struct GeolocationController {
    state: TrackingState,
    is_first_fix: bool,
    is_user_initiated: bool,
    is_popup_open: bool,
    paused_for_popup: bool,
    detached: bool,
    last_position: Option<GeoPoint>,
    points_of_interest: Vec<PointOfInterest>,
    markers: DistanceMarkerSet,
    search_radius: SearchRadius,
}

impl Default for GeolocationController {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationController {
    pub fn new() -> Self {
        Self {
            state: TrackingState::Off,
            is_first_fix: true,
            is_user_initiated: false,
            is_popup_open: false,
            paused_for_popup: false,
            detached: false,
            last_position: None,
            points_of_interest: Vec::new(),
            markers: DistanceMarkerSet::new(DISTANCE_MARKER_RADIUS_M),
            search_radius: SearchRadius::new(DISTANCE_MARKER_RADIUS_M),
        }
    }

    pub fn is_first_fix(&self) -> bool {
        self.is_first_fix
    }

    pub fn is_user_initiated(&self) -> bool {
        self.is_user_initiated
    }

    pub fn is_popup_open(&self) -> bool {
        self.is_popup_open
    }

    pub fn is_paused_for_popup(&self) -> bool {
        self.paused_for_popup
    }

    pub fn last_position(&self) -> Option<GeoPoint> {
        self.last_position
    }

    pub fn markers(&self) -> &DistanceMarkerSet {
        &self.markers
    }

    pub fn set_points_of_interest(&mut self, pois: Vec<PointOfInterest>) {
        log::debug!("{} points of interest for distance markers", pois.len());
        self.points_of_interest = pois;
    }

    /// Stops reacting to fixes and errors. Stale responses for a map that
    /// went away are dropped.
    pub fn detach(&mut self) {
        self.detached = true;
        self.is_user_initiated = false;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Arms the boundary check for the next fix and shows the ring. The check
    /// itself waits for the fix, so background fixes never flash the prompt.
    pub fn on_locate_button_clicked(
        &mut self,
        map: &mut dyn MapHost,
        gate: &mut BoundaryGate,
        now: Instant,
    ) {
        self.is_user_initiated = true;
        log::debug!("locate requested by user");
        gate.show_visual(map, now);
    }

    pub fn on_tracking_started(
        &mut self,
        map: &mut dyn MapHost,
        control: &mut dyn LocationControl,
        gate: &mut BoundaryGate,
        now: Instant,
    ) {
        log::info!("location tracking started");
        self.state = match control.watch_state() {
            TrackingState::Off => TrackingState::ActiveLock,
            state => state,
        };
        if self.is_popup_open {
            self.pause_tracking(control);
        }
        gate.show_visual(map, now);
    }

    pub fn on_tracking_ended(&mut self, map: &mut dyn MapHost) {
        log::info!("location tracking ended");
        self.state = TrackingState::Off;
        self.is_first_fix = true;
        self.paused_for_popup = false;
        self.clear_user_visuals(map);
        map.ease_to(CameraOptions::new().bearing(0.0).pitch(45.0));
    }

    /// Stops the camera from following while a popup covers the map
    pub fn pause_tracking(&mut self, control: &mut dyn LocationControl) {
        if self.state == TrackingState::ActiveLock {
            self.set_state(TrackingState::ActiveError, control);
            self.paused_for_popup = true;
        }
    }

    pub fn resume_tracking(&mut self, control: &mut dyn LocationControl) {
        if self.paused_for_popup {
            self.set_state(TrackingState::ActiveLock, control);
            self.paused_for_popup = false;
        }
    }

    pub fn set_popup_open(&mut self, open: bool, control: &mut dyn LocationControl) {
        self.is_popup_open = open;
        if open {
            self.pause_tracking(control);
        } else {
            self.resume_tracking(control);
        }
    }

    fn set_state(&mut self, state: TrackingState, control: &mut dyn LocationControl) {
        if self.state != state {
            log::debug!("tracking {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        control.set_watch_state(state);
    }

    fn clear_user_visuals(&mut self, map: &mut dyn MapHost) {
        self.search_radius.clear(map);
        self.markers.clear(map);
    }

    /// Turns tracking off and shows the boundary prompt
    fn reject_fix(
        &mut self,
        point: GeoPoint,
        trigger: RejectTrigger,
        cx: &mut GeolocateContext<'_>,
    ) {
        log::warn!("location {:?} outside the boundary ({:?})", point, trigger);

        self.set_state(TrackingState::Off, cx.control);
        self.paused_for_popup = false;
        cx.control.reset_button();
        cx.control.remove_user_marker();
        self.clear_user_visuals(cx.map);

        if trigger == RejectTrigger::UserRequest {
            cx.gate.show_visual(cx.map, cx.now);
        }
        cx.gate.present_prompt(cx.map, cx.ui, cx.popups, cx.timers, cx.now);
        if trigger == RejectTrigger::Drift {
            cx.map.fly_to(cx.gate.overview_camera());
        }
    }

    fn accept_fix(
        &mut self,
        fix: &LocationFix,
        user_initiated: bool,
        cx: &mut GeolocateContext<'_>,
    ) {
        let point = fix.position();
        self.last_position = Some(point);

        if user_initiated && self.state == TrackingState::Off {
            self.set_state(TrackingState::ActiveLock, cx.control);
            if self.is_popup_open {
                self.pause_tracking(cx.control);
            }
        }

        self.search_radius.update(point, cx.map);
        self.markers.recompute(point, &self.points_of_interest, cx.map);

        if self.is_popup_open {
            log::debug!("popup open, camera left alone");
            return;
        }

        if self.is_first_fix {
            cx.map.fly_to(
                CameraOptions::new()
                    .center(point)
                    .zoom(FIRST_FIX_ZOOM)
                    .pitch(45.0)
                    .bearing(fix.heading().unwrap_or(0.0))
                    .duration_ms(2000),
            );
            self.is_first_fix = false;
        } else if cx.map.center().distance_m(&point) > CAMERA_FOLLOW_THRESHOLD_M {
            cx.map.ease_to(CameraOptions::new().center(point).duration_ms(1000));
        }
    }
}

impl GeolocateHandler for GeolocationController {
    fn on_fix_resolved(&mut self, fix: &LocationFix, cx: &mut GeolocateContext<'_>) -> FixOutcome {
        if self.detached {
            log::debug!("ignoring fix after detach");
            return FixOutcome::Ignored;
        }
        let point = fix.position();
        if !point.is_valid() {
            log::warn!("ignoring invalid fix {:?}", point);
            self.is_user_initiated = false;
            return FixOutcome::Ignored;
        }

        let user_initiated = std::mem::replace(&mut self.is_user_initiated, false);
        if cx.gate.is_within_boundary(point) {
            self.accept_fix(fix, user_initiated, cx);
            return FixOutcome::Accepted;
        }

        let trigger = if user_initiated {
            RejectTrigger::UserRequest
        } else if self.state.is_tracking() {
            RejectTrigger::Drift
        } else {
            log::debug!("background fix outside the boundary ignored");
            return FixOutcome::Ignored;
        };
        self.reject_fix(point, trigger, cx);
        FixOutcome::Rejected(trigger)
    }

    fn on_fix_failed(&mut self, error: &PositionError, cx: &mut GeolocateContext<'_>) {
        if self.detached {
            return;
        }
        let kind = error.kind();
        if !std::mem::replace(&mut self.is_user_initiated, false) {
            log::debug!("background geolocation error: {}", kind);
            return;
        }

        log::warn!("geolocation failed ({}): {}", error.code, kind);
        self.set_state(TrackingState::Off, cx.control);
        self.paused_for_popup = false;
        cx.control.reset_button();

        let id = cx.popups.notify(&kind.to_string(), cx.ui);
        cx.timers.schedule_after(cx.now, NOTIFICATION_LIFETIME, Deferred::RemoveNotification(id));
    }

    fn current_state(&self) -> TrackingState {
        self.state
    }
}

impl PluginTrait for GeolocationController {
    fn name(&self) -> &str {
        "geolocate"
    }

    fn on_style_loaded(&mut self, map: &mut dyn MapHost) -> Result<()> {
        self.search_radius.install(map)
    }

    fn on_remove(&mut self, map: &mut dyn MapHost) -> Result<()> {
        self.clear_user_visuals(map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BoundaryConfig, ViewConfig};
    use crate::headless::{HeadlessLocationControl, HeadlessMap, HeadlessUi, MapCommand};
    use crate::input::events::GeolocationError;

    struct Harness {
        map: HeadlessMap,
        control: HeadlessLocationControl,
        ui: HeadlessUi,
        gate: BoundaryGate,
        popups: PopupManager,
        timers: TimerQueue,
        now: Instant,
        controller: GeolocationController,
    }

    impl Harness {
        fn new() -> Self {
            let gate = BoundaryGate::new(BoundaryConfig::default(), ViewConfig::default());
            let mut map = HeadlessMap::default();
            gate.install(&mut map).unwrap();
            let mut controller = GeolocationController::new();
            controller.on_style_loaded(&mut map).unwrap();
            Self {
                map,
                control: HeadlessLocationControl::default(),
                ui: HeadlessUi::default(),
                gate,
                popups: PopupManager::new(),
                timers: TimerQueue::new(),
                now: Instant::now(),
                controller,
            }
        }

        fn center(&self) -> GeoPoint {
            self.gate.center()
        }

        fn click(&mut self) {
            self.controller.on_locate_button_clicked(&mut self.map, &mut self.gate, self.now);
        }

        fn fix(&mut self, point: GeoPoint) -> FixOutcome {
            self.resolve(LocationFix::new(point))
        }

        fn resolve(&mut self, fix: LocationFix) -> FixOutcome {
            let mut cx = GeolocateContext {
                map: &mut self.map,
                control: &mut self.control,
                ui: &mut self.ui,
                gate: &mut self.gate,
                popups: &mut self.popups,
                timers: &mut self.timers,
                now: self.now,
            };
            self.controller.on_fix_resolved(&fix, &mut cx)
        }

        fn fail(&mut self, code: u16) {
            let mut cx = GeolocateContext {
                map: &mut self.map,
                control: &mut self.control,
                ui: &mut self.ui,
                gate: &mut self.gate,
                popups: &mut self.popups,
                timers: &mut self.timers,
                now: self.now,
            };
            self.controller.on_fix_failed(&PositionError::new(code), &mut cx);
        }
    }

    #[test]
    fn user_request_outside_is_rejected_once() {
        let mut h = Harness::new();
        let outside = h.center().destination(0.0, 2.0);

        h.click();
        assert!(h.controller.is_user_initiated());
        assert_eq!(h.fix(outside), FixOutcome::Rejected(RejectTrigger::UserRequest));

        assert_eq!(h.controller.current_state(), TrackingState::Off);
        assert_eq!(h.control.watch_state(), TrackingState::Off);
        assert!(!h.controller.is_user_initiated());
        assert_eq!(h.ui.prompts_shown(), 1);
        assert!(h.control.user_marker_removed());
    }

    #[test]
    fn background_fix_outside_while_off_is_ignored() {
        let mut h = Harness::new();
        let outside = h.center().destination(0.0, 2.0);

        assert_eq!(h.fix(outside), FixOutcome::Ignored);
        assert_eq!(h.ui.prompts_shown(), 0);
    }

    #[test]
    fn drift_outside_rejects_and_flies_wide() {
        let mut h = Harness::new();
        let center = h.center();
        h.click();
        assert_eq!(h.fix(center), FixOutcome::Accepted);
        assert_eq!(h.controller.current_state(), TrackingState::ActiveLock);

        let outside = center.destination(90.0, 1.0);
        assert_eq!(h.fix(outside), FixOutcome::Rejected(RejectTrigger::Drift));
        assert_eq!(h.controller.current_state(), TrackingState::Off);
        assert_eq!(h.ui.prompts_shown(), 1);

        match h.map.camera_commands().last() {
            Some(MapCommand::FlyTo(options)) => {
                assert_eq!(options.center, Some(center));
                assert_eq!(options.zoom, Some(14.0));
                assert_eq!(options.pitch, Some(0.0));
            }
            other => panic!("expected a wide fly-to, got {other:?}"),
        }
    }

    #[test]
    fn first_fix_flies_then_follows_beyond_threshold() {
        let mut h = Harness::new();
        let start = h.center();
        h.click();
        h.fix(start);

        assert!(!h.controller.is_first_fix());
        match h.map.camera_commands().last() {
            Some(MapCommand::FlyTo(options)) => {
                assert_eq!(options.zoom, Some(17.5));
                assert_eq!(options.bearing, Some(0.0));
            }
            other => panic!("expected a fly-to, got {other:?}"),
        }

        h.map.set_center(start);
        let commands = h.map.camera_commands().len();
        h.fix(start.destination(0.0, 0.020));
        assert_eq!(h.map.camera_commands().len(), commands);

        h.fix(start.destination(0.0, 0.080));
        assert!(matches!(
            h.map.camera_commands().last(),
            Some(MapCommand::EaseTo(_))
        ));
    }

    #[test]
    fn first_fly_to_faces_the_reported_heading() {
        let mut h = Harness::new();
        h.click();
        let fix = LocationFix::new(h.center()).with_heading(90.0);
        assert_eq!(h.resolve(fix), FixOutcome::Accepted);

        match h.map.camera_commands().last() {
            Some(MapCommand::FlyTo(options)) => assert_eq!(options.bearing, Some(90.0)),
            other => panic!("expected a fly-to, got {other:?}"),
        }
    }

    #[test]
    fn open_popup_keeps_camera_still() {
        let mut h = Harness::new();
        h.controller.set_popup_open(true, &mut h.control);
        h.click();
        h.fix(h.center());

        assert!(h.map.camera_commands().is_empty());
        assert!(h.controller.is_first_fix());
        assert_eq!(h.controller.current_state(), TrackingState::ActiveError);
        assert!(h.controller.is_paused_for_popup());
    }

    #[test]
    fn pause_and_resume() {
        let mut h = Harness::new();
        h.click();
        h.fix(h.center());

        h.controller.pause_tracking(&mut h.control);
        assert_eq!(h.controller.current_state(), TrackingState::ActiveError);
        assert_eq!(h.control.watch_state(), TrackingState::ActiveError);

        h.controller.resume_tracking(&mut h.control);
        assert_eq!(h.controller.current_state(), TrackingState::ActiveLock);

        h.controller.resume_tracking(&mut h.control);
        assert_eq!(h.controller.current_state(), TrackingState::ActiveLock);
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let mut h = Harness::new();
        h.controller.resume_tracking(&mut h.control);
        assert_eq!(h.controller.current_state(), TrackingState::Off);
        assert!(h.control.state_changes().is_empty());
    }

    #[test]
    fn errors_surface_only_when_user_initiated() {
        let mut h = Harness::new();
        h.fail(3);
        assert_eq!(h.popups.visible_notifications(), 0);

        h.click();
        h.fail(1);
        assert!(!h.controller.is_user_initiated());
        assert_eq!(
            h.ui.notifications(),
            vec![GeolocationError::PermissionDenied.to_string()]
        );
        assert_eq!(h.timers.len(), 1);
    }

    #[test]
    fn tracking_end_resets_session() {
        let mut h = Harness::new();
        let center = h.center();
        h.controller.set_points_of_interest(vec![PointOfInterest::new(
            "fountain",
            center.destination(45.0, 0.010),
        )]);
        h.click();
        h.fix(center);
        assert_eq!(h.controller.markers().len(), 1);

        h.controller.on_tracking_ended(&mut h.map);
        assert!(h.controller.is_first_fix());
        assert!(h.controller.markers().is_empty());
        assert!(h.map.marker_ids().is_empty());
        match h.map.camera_commands().last() {
            Some(MapCommand::EaseTo(options)) => {
                assert_eq!(options.bearing, Some(0.0));
                assert_eq!(options.pitch, Some(45.0));
            }
            other => panic!("expected an ease-to, got {other:?}"),
        }
    }

    #[test]
    fn detached_controller_ignores_callbacks() {
        let mut h = Harness::new();
        h.click();
        h.controller.detach();
        assert_eq!(h.fix(h.center().destination(0.0, 2.0)), FixOutcome::Ignored);
        h.fail(1);
        assert_eq!(h.ui.prompts_shown(), 0);
        assert_eq!(h.popups.visible_notifications(), 0);
    }
}
