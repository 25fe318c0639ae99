use crate::core::config::GeolocationOptions;
use crate::data::storage::{KeyValueStorage, StorageEvent};
use crate::input::events::{Coordinates, LocationFix, PositionError};
use crate::{MapError, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// `window.localStorage`
///
/// Looked up on every call, so a page that loses storage access (private
/// browsing, quota) degrades to errors instead of a stale handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebStorage;

impl WebStorage {
    pub fn new() -> Self {
        Self
    }

    /// Whether the page can reach `localStorage` at all
    pub fn is_available() -> bool {
        local_storage().is_ok()
    }
}

fn local_storage() -> Result<web_sys::Storage> {
    let window =
        web_sys::window().ok_or_else(|| MapError::Storage("no window object".to_string()))?;
    window
        .local_storage()
        .map_err(|e| MapError::Storage(format!("localStorage error: {:?}", e)))?
        .ok_or_else(|| MapError::Storage("localStorage unavailable".to_string()))
}

impl KeyValueStorage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        local_storage()?
            .get_item(key)
            .map_err(|e| MapError::Storage(format!("get_item({key}) failed: {:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| MapError::Storage(format!("set_item({key}) failed: {:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| MapError::Storage(format!("remove_item({key}) failed: {:?}", e)))
    }
}

impl From<&web_sys::StorageEvent> for StorageEvent {
    fn from(event: &web_sys::StorageEvent) -> Self {
        Self {
            key: event.key(),
            new_value: event.new_value(),
        }
    }
}

impl From<&web_sys::Position> for LocationFix {
    fn from(position: &web_sys::Position) -> Self {
        let coords = position.coords();
        Self {
            coords: Coordinates {
                latitude: coords.latitude(),
                longitude: coords.longitude(),
                accuracy: Some(coords.accuracy()),
                heading: coords.heading(),
            },
            timestamp: position.timestamp() as u64,
        }
    }
}

impl From<&web_sys::PositionError> for PositionError {
    fn from(error: &web_sys::PositionError) -> Self {
        Self {
            code: error.code(),
            message: error.message(),
        }
    }
}

impl From<&GeolocationOptions> for web_sys::PositionOptions {
    fn from(options: &GeolocationOptions) -> Self {
        let web = web_sys::PositionOptions::new();
        web.set_enable_high_accuracy(options.enable_high_accuracy);
        web.set_maximum_age(u32::try_from(options.maximum_age_ms).unwrap_or(u32::MAX));
        web.set_timeout(u32::try_from(options.timeout_ms).unwrap_or(u32::MAX));
        web
    }
}

/// Subscription to `storage` events from other tabs. Unsubscribes on drop.
pub struct StorageListener {
    window: web_sys::Window,
    closure: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl StorageListener {
    pub fn new(mut on_change: impl FnMut(StorageEvent) + 'static) -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| MapError::Storage("no window object".to_string()))?;
        let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
            move |event: web_sys::StorageEvent| on_change(StorageEvent::from(&event)),
        );
        window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .map_err(|e| MapError::Storage(format!("cannot listen for storage events: {:?}", e)))?;
        log::debug!("listening for storage events");

        Ok(Self { window, closure })
    }
}

impl Drop for StorageListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("storage", self.closure.as_ref().unchecked_ref());
    }
}
