//! Category filter state, persisted and kept consistent across tabs
//!
//! Every mutation replaces the whole active set, then re-syncs the filter
//! buttons, rebuilds the map filter, and (for local changes only) writes the
//! set back to storage. Changes arriving from another tab are applied without
//! writing, otherwise two tabs would echo the same value back and forth.

use crate::{
    core::{config::FilterConfig, constants::CATEGORY_PROPERTY},
    data::storage::{KeyValueStorage, StorageEvent},
    traits::{MapHost, UiSurface},
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::rc::Rc;

pub type Category = String;

/// Where a filter change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A toggle or call in this tab; persisted
    Local,
    /// A storage change made by another tab; not persisted
    External,
}

/// Map layer filter derived from the active set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    ShowAll,
    CategoryIn(Vec<Category>),
}

impl FilterExpression {
    pub fn from_active(active: &BTreeSet<Category>) -> Self {
        if active.is_empty() {
            FilterExpression::ShowAll
        } else {
            FilterExpression::CategoryIn(active.iter().cloned().collect())
        }
    }

    /// Style-spec expression, `None` meaning "no filter"
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FilterExpression::ShowAll => None,
            FilterExpression::CategoryIn(categories) => Some(json!([
                "in",
                ["get", CATEGORY_PROPERTY],
                ["literal", categories]
            ])),
        }
    }

    /// Whether a feature with the given category passes the filter
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            FilterExpression::ShowAll => true,
            FilterExpression::CategoryIn(categories) => {
                category.is_some_and(|c| categories.iter().any(|active| active == c))
            }
        }
    }
}

/// Parses a stored filter payload. Absent or malformed data yields an empty
/// set: the map then shows everything instead of failing.
pub fn parse_categories(raw: Option<&str>) -> BTreeSet<Category> {
    let Some(raw) = raw else {
        return BTreeSet::new();
    };
    match serde_json::from_str::<Option<Vec<Category>>>(raw) {
        Ok(categories) => categories.unwrap_or_default().into_iter().collect(),
        Err(e) => {
            log::warn!("ignoring malformed filter payload {:?}: {}", raw, e);
            BTreeSet::new()
        }
    }
}

pub struct FilterStore {
    active: BTreeSet<Category>,
    storage: Rc<dyn KeyValueStorage>,
    storage_key: String,
    layers: Vec<String>,
}

impl FilterStore {
    /// Restores the active set from storage
    pub fn load(storage: Rc<dyn KeyValueStorage>, config: &FilterConfig) -> Self {
        let stored = match storage.get_item(&config.storage_key) {
            Ok(value) => value,
            Err(e) => {
                log::error!("could not read filters from storage: {}", e);
                None
            }
        };
        let active = parse_categories(stored.as_deref());
        log::debug!("restored {} active filters", active.len());

        Self {
            active,
            storage,
            storage_key: config.storage_key.clone(),
            layers: config.layers.clone(),
        }
    }

    pub fn active_categories(&self) -> &BTreeSet<Category> {
        &self.active
    }

    pub fn is_active(&self, category: &str) -> bool {
        self.active.contains(category)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn toggle_category(
        &mut self,
        category: &str,
        map: &mut dyn MapHost,
        ui: &mut dyn UiSurface,
    ) {
        let mut next = self.active.clone();
        if !next.remove(category) {
            next.insert(category.to_string());
        }
        self.set_active_categories(next, ChangeOrigin::Local, map, ui);
    }

    /// Replaces the whole active set
    pub fn set_active_categories<I>(
        &mut self,
        categories: I,
        origin: ChangeOrigin,
        map: &mut dyn MapHost,
        ui: &mut dyn UiSurface,
    ) where
        I: IntoIterator<Item = Category>,
    {
        self.active = categories.into_iter().collect();
        log::debug!("active filters now {:?} ({:?})", self.active, origin);

        ui.sync_filter_buttons(&self.active);
        self.apply_map_filters(map);
        if origin == ChangeOrigin::Local {
            self.persist();
        }
    }

    pub fn build_map_filter_expression(&self) -> FilterExpression {
        FilterExpression::from_active(&self.active)
    }

    /// Applies the current filter to every configured layer that exists.
    /// Missing layers are skipped; call again once the map is idle.
    pub fn apply_map_filters(&self, map: &mut dyn MapHost) {
        let filter = self.build_map_filter_expression().to_json();
        for layer_id in &self.layers {
            if !map.has_layer(layer_id) {
                log::debug!("filter target {} not loaded yet", layer_id);
                continue;
            }
            if let Err(e) = map.set_filter(layer_id, filter.clone()) {
                log::warn!("could not apply filter to layer {}: {}", layer_id, e);
            }
        }
    }

    /// Re-applies state to the UI and map without touching storage
    pub fn sync(&self, map: &mut dyn MapHost, ui: &mut dyn UiSurface) {
        ui.sync_filter_buttons(&self.active);
        self.apply_map_filters(map);
    }

    /// Handles a change notification from another tab. Returns whether the
    /// event concerned the filter key.
    pub fn on_storage_event(
        &mut self,
        event: &StorageEvent,
        map: &mut dyn MapHost,
        ui: &mut dyn UiSurface,
    ) -> bool {
        if !event.is_for(&self.storage_key) {
            return false;
        }
        let categories = parse_categories(event.new_value.as_deref());
        self.set_active_categories(categories, ChangeOrigin::External, map, ui);
        true
    }

    fn serialize(&self) -> String {
        let list: Vec<&Category> = self.active.iter().collect();
        serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string())
    }

    fn persist(&self) {
        let payload = self.serialize();
        match self.storage.get_item(&self.storage_key) {
            Ok(Some(current)) if current == payload => return,
            _ => {}
        }
        if let Err(e) = self.storage.set_item(&self.storage_key, &payload) {
            log::error!("could not save filters to storage: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::MemoryStorage;
    use crate::headless::{HeadlessMap, HeadlessUi};

    fn store_with(storage: &Rc<MemoryStorage>) -> FilterStore {
        FilterStore::load(storage.clone(), &FilterConfig::default())
    }

    fn set(items: &[&str]) -> BTreeSet<Category> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_fails_open() {
        assert!(parse_categories(None).is_empty());
        assert!(parse_categories(Some("not json")).is_empty());
        assert!(parse_categories(Some("{\"a\":1}")).is_empty());
        assert!(parse_categories(Some("[1,2]")).is_empty());
        assert!(parse_categories(Some("null")).is_empty());
        assert_eq!(parse_categories(Some(r#"["EAT","SHOP","EAT"]"#)), set(&["EAT", "SHOP"]));
    }

    #[test]
    fn expression_shows_all_when_empty() {
        assert_eq!(FilterExpression::from_active(&BTreeSet::new()).to_json(), None);
        assert!(FilterExpression::ShowAll.matches(None));
    }

    #[test]
    fn expression_is_membership_test() {
        let expr = FilterExpression::from_active(&set(&["SHOP", "EAT"]));
        assert_eq!(
            expr.to_json(),
            Some(json!(["in", ["get", "category"], ["literal", ["EAT", "SHOP"]]]))
        );
        assert!(expr.matches(Some("SHOP")));
        assert!(!expr.matches(Some("CULTURE")));
        assert!(!expr.matches(None));
    }

    #[test]
    fn toggle_flips_membership_and_persists() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        let mut map = HeadlessMap::with_layers(&["location-markers", "location-icons"]);
        let mut ui = HeadlessUi::default();

        store.toggle_category("SHOP", &mut map, &mut ui);
        assert!(store.is_active("SHOP"));
        assert_eq!(
            storage.get_item("heerlenActiveFilters").unwrap().as_deref(),
            Some(r#"["SHOP"]"#)
        );
        assert_eq!(ui.active_buttons(), set(&["SHOP"]));
        assert!(map.filter("location-markers").is_some());
        assert!(map.filter("location-icons").is_some());

        store.toggle_category("SHOP", &mut map, &mut ui);
        assert!(store.active_categories().is_empty());
        assert_eq!(storage.get_item("heerlenActiveFilters").unwrap().as_deref(), Some("[]"));
        assert_eq!(map.filter("location-markers"), None);
    }

    #[test]
    fn reload_restores_persisted_set() {
        let storage = Rc::new(MemoryStorage::new());
        let mut map = HeadlessMap::default();
        let mut ui = HeadlessUi::default();

        let mut store = store_with(&storage);
        store.set_active_categories(
            vec!["shop".to_string(), "eat".to_string()],
            ChangeOrigin::Local,
            &mut map,
            &mut ui,
        );

        let reloaded = store_with(&storage);
        assert_eq!(reloaded.active_categories(), &set(&["eat", "shop"]));
    }

    #[test]
    fn external_changes_are_not_persisted() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        let mut map = HeadlessMap::default();
        let mut ui = HeadlessUi::default();

        let event = StorageEvent::new("heerlenActiveFilters", Some(r#"["EAT"]"#.to_string()));
        assert!(store.on_storage_event(&event, &mut map, &mut ui));
        assert!(store.on_storage_event(&event, &mut map, &mut ui));

        assert_eq!(store.active_categories(), &set(&["EAT"]));
        assert_eq!(storage.write_count(), 0);
        assert_eq!(ui.active_buttons(), set(&["EAT"]));
    }

    #[test]
    fn unrelated_or_malformed_events() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        let mut map = HeadlessMap::default();
        let mut ui = HeadlessUi::default();
        store.set_active_categories(
            vec!["EAT".to_string()],
            ChangeOrigin::Local,
            &mut map,
            &mut ui,
        );

        let other = StorageEvent::new("heerlen_map_performance", Some("{}".to_string()));
        assert!(!store.on_storage_event(&other, &mut map, &mut ui));
        assert!(store.is_active("EAT"));

        let broken = StorageEvent::new("heerlenActiveFilters", Some("[oops".to_string()));
        assert!(store.on_storage_event(&broken, &mut map, &mut ui));
        assert!(store.active_categories().is_empty());
    }

    #[test]
    fn identical_local_payload_is_written_once() {
        let storage = Rc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        let mut map = HeadlessMap::default();
        let mut ui = HeadlessUi::default();

        for _ in 0..2 {
            store.set_active_categories(
                vec!["EAT".to_string(), "SHOP".to_string()],
                ChangeOrigin::Local,
                &mut map,
                &mut ui,
            );
        }
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn write_failure_keeps_state() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_read_only(true);
        let mut store = store_with(&storage);
        let mut map = HeadlessMap::default();
        let mut ui = HeadlessUi::default();

        store.toggle_category("SHOP", &mut map, &mut ui);
        assert!(store.is_active("SHOP"));
        assert_eq!(storage.get_item("heerlenActiveFilters").unwrap(), None);
    }
}
