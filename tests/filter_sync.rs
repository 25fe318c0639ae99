#[cfg(test)]
mod filter_sync_tests {
    use mapgate::{
        headless::{HeadlessLocationControl, HeadlessMap, HeadlessUi},
        CityMap, KeyValueStorage, MapConfig, MapEvent, MapHost, MemoryStorage, StorageEvent,
    };
    use serde_json::json;
    use std::{collections::BTreeSet, rc::Rc};

    type City = CityMap<HeadlessMap, HeadlessLocationControl, HeadlessUi>;

    const KEY: &str = "heerlenActiveFilters";

    fn tab(storage: &Rc<MemoryStorage>) -> City {
        let _ = env_logger::builder().is_test(true).try_init();
        let map = HeadlessMap::with_layers(&["location-markers", "location-labels", "3d-models"]);
        let mut city = CityMap::new(
            MapConfig::default(),
            map,
            HeadlessLocationControl::default(),
            HeadlessUi::default(),
            storage.clone(),
        )
        .unwrap();
        city.handle(MapEvent::StyleLoaded, instant::Instant::now())
            .unwrap();
        city
    }

    /// Delivers every pending change notification to `other`, the way the
    /// browser notifies the tabs that did not write
    fn deliver(storage: &MemoryStorage, other: &mut City) {
        for event in storage.take_events() {
            other
                .handle(MapEvent::StorageChanged(event), instant::Instant::now())
                .unwrap();
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_in_one_tab_shows_up_in_the_other() {
        let storage = Rc::new(MemoryStorage::new());
        let mut a = tab(&storage);
        let mut b = tab(&storage);

        a.handle(
            MapEvent::FilterButtonClicked {
                category: "EAT".to_string(),
            },
            instant::Instant::now(),
        )
        .unwrap();
        assert_eq!(storage.write_count(), 1);

        deliver(&storage, &mut b);
        assert_eq!(b.filters().active_categories(), &set(&["EAT"]));
        assert_eq!(b.ui().active_buttons(), set(&["EAT"]));
        assert_eq!(
            b.map().filter("location-labels"),
            Some(json!(["in", ["get", "category"], ["literal", ["EAT"]]]))
        );

        // Applying the external change wrote nothing back
        assert_eq!(storage.write_count(), 1);
        assert!(storage.take_events().is_empty());
    }

    #[test]
    fn clearing_the_last_filter_shows_everything() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(KEY, r#"["SHOP","EAT"]"#).unwrap();
        storage.take_events();
        let mut a = tab(&storage);
        let mut b = tab(&storage);
        assert_eq!(b.filters().active_categories(), &set(&["EAT", "SHOP"]));

        a.toggle_category("SHOP");
        a.toggle_category("EAT");
        assert!(a.filters().active_categories().is_empty());
        assert_eq!(a.map().filter("location-markers"), None);

        deliver(&storage, &mut b);
        assert!(b.filters().active_categories().is_empty());
        assert_eq!(b.map().filter("location-markers"), None);
        assert_eq!(
            storage.get_item(KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn removed_key_clears_filters() {
        let storage = Rc::new(MemoryStorage::new());
        let mut a = tab(&storage);
        a.set_active_categories(["SEE".to_string()]);
        assert!(a.filters().is_active("SEE"));

        a.handle(
            MapEvent::StorageChanged(StorageEvent::new(KEY, None)),
            instant::Instant::now(),
        )
        .unwrap();
        assert!(a.filters().active_categories().is_empty());
    }

    #[test]
    fn malformed_storage_starts_empty() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(KEY, "{not json").unwrap();
        let a = tab(&storage);

        assert!(a.filters().active_categories().is_empty());
        assert!(a.ui().active_buttons().is_empty());
        assert_eq!(a.map().filter("location-markers"), None);
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let storage = Rc::new(MemoryStorage::new());
        let mut a = tab(&storage);
        a.set_active_categories(["EAT".to_string()]);

        a.handle(
            MapEvent::StorageChanged(StorageEvent::new("someOtherKey", Some("[]".to_string()))),
            instant::Instant::now(),
        )
        .unwrap();
        a.handle(
            MapEvent::StorageChanged(StorageEvent {
                key: None,
                new_value: None,
            }),
            instant::Instant::now(),
        )
        .unwrap();
        assert_eq!(a.filters().active_categories(), &set(&["EAT"]));
    }

    #[test]
    fn filters_survive_a_style_reload() {
        let storage = Rc::new(MemoryStorage::new());
        let mut a = tab(&storage);
        a.set_active_categories(["EAT".to_string(), "SEE".to_string()]);

        a.map_mut().reload_style();
        a.map_mut().add_style_layer("location-markers");
        a.handle(MapEvent::StyleLoaded, instant::Instant::now())
            .unwrap();

        assert_eq!(
            a.map().filter("location-markers"),
            Some(json!(["in", ["get", "category"], ["literal", ["EAT", "SEE"]]]))
        );
    }

    #[test]
    fn three_d_preference_follows_other_tabs() {
        let storage = Rc::new(MemoryStorage::new());
        let mut a = tab(&storage);
        let mut b = tab(&storage);

        a.handle(MapEvent::Toggle3d { enabled: false }, instant::Instant::now())
            .unwrap();
        deliver(&storage, &mut b);

        assert!(!b.performance().is_3d_enabled);
        assert_eq!(
            b.map().layout_property("3d-models", "visibility"),
            Some(json!("none"))
        );
        assert!(b.map().has_layer("3d-models"));
    }
}
