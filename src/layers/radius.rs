use crate::{
    core::{
        constants::{
            BOUNDARY_COLOR, CIRCLE_SEGMENTS, SEARCH_RADIUS_OUTER_SOURCE_ID,
            SEARCH_RADIUS_SOURCE_ID,
        },
        geo::{generate_circle, GeoPoint},
    },
    data::geojson::{GeoJson, GeoJsonFeature},
    layers::base::{LayerSpec, LayerType},
    traits::MapHost,
    Result,
};

/// The two translucent rings drawn around the user position
#[derive(Debug, Clone)]
pub struct SearchRadius {
    radius_m: f64,
}

impl SearchRadius {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    fn rings() -> [(&'static str, f64, f64); 2] {
        [
            (SEARCH_RADIUS_SOURCE_ID, 0.08, 1.0),
            (SEARCH_RADIUS_OUTER_SOURCE_ID, 0.04, 2.0),
        ]
    }

    /// Adds the sources and layers unless the style already has them
    pub fn install(&self, map: &mut dyn MapHost) -> Result<()> {
        if map.has_source(SEARCH_RADIUS_SOURCE_ID) {
            return Ok(());
        }

        for (id, opacity, height) in Self::rings() {
            map.add_source(id, GeoJsonFeature::empty_polygon().into())?;
            map.add_layer(
                LayerSpec::new(id, LayerType::FillExtrusion, id)
                    .paint("fill-extrusion-color", BOUNDARY_COLOR)
                    .paint("fill-extrusion-opacity", opacity)
                    .paint("fill-extrusion-height", height)
                    .paint("fill-extrusion-base", 0.0),
            )?;
        }
        log::debug!("search radius layers added");
        Ok(())
    }

    pub fn update(&self, center: GeoPoint, map: &mut dyn MapHost) {
        let ring = generate_circle(center, self.radius_m, CIRCLE_SEGMENTS);
        self.set_all(GeoJsonFeature::polygon(ring).into(), map);
    }

    pub fn clear(&self, map: &mut dyn MapHost) {
        self.set_all(GeoJsonFeature::empty_polygon().into(), map);
    }

    fn set_all(&self, data: GeoJson, map: &mut dyn MapHost) {
        for (id, _, _) in Self::rings() {
            if !map.has_source(id) {
                log::warn!("search radius source {} not found", id);
                continue;
            }
            if let Err(e) = map.set_source_data(id, data.clone()) {
                log::warn!("failed to update search radius {}: {}", id, e);
            }
        }
    }
}
