use crate::core::{constants::CATEGORY_PROPERTY, geo::GeoPoint};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// GeoJSON geometry types used by the subsystem.
///
/// Positions are [`GeoPoint`]s, which serialize as `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: GeoPoint },
    LineString { coordinates: Vec<GeoPoint> },
    Polygon { coordinates: Vec<Vec<GeoPoint>> },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GeoJsonFeature {
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    /// A polygon feature with a single closed ring
    pub fn polygon(ring: Vec<GeoPoint>) -> Self {
        Self::new(GeoJsonGeometry::Polygon {
            coordinates: vec![ring],
        })
    }

    /// A polygon with one empty ring. The map engine accepts it and draws nothing,
    /// which is how a ring source is cleared without removing the source.
    pub fn empty_polygon() -> Self {
        Self::polygon(Vec::new())
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    pub fn from_str(geojson_str: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| crate::MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    pub fn features(&self) -> &[GeoJsonFeature] {
        match self {
            GeoJson::Feature(feature) => std::slice::from_ref(feature),
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

impl From<GeoJsonFeature> for GeoJson {
    fn from(feature: GeoJsonFeature) -> Self {
        GeoJson::Feature(feature)
    }
}

/// A marker location read from the CMS-rendered feature collection
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub id: String,
    pub position: GeoPoint,
    pub category: Option<String>,
    pub name: Option<String>,
}

impl PointOfInterest {
    pub fn new(id: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            position,
            category: None,
            name: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Reads a point feature. Features without point geometry are skipped.
    /// Without an explicit id the feature's index is used.
    pub fn from_feature(index: usize, feature: &GeoJsonFeature) -> Option<Self> {
        let position = match feature.geometry.as_ref()? {
            GeoJsonGeometry::Point { coordinates } => *coordinates,
            _ => return None,
        };
        let id = match &feature.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => index.to_string(),
        };

        Some(Self {
            id,
            position,
            category: feature.property_str(CATEGORY_PROPERTY).map(str::to_string),
            name: feature.property_str("name").map(str::to_string),
        })
    }
}

/// Every point of interest in a GeoJSON document
pub fn points_of_interest(data: &GeoJson) -> Vec<PointOfInterest> {
    data.features()
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| PointOfInterest::from_feature(index, feature))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "id": "glaspaleis",
              "geometry": { "type": "Point", "coordinates": [5.9787, 50.8868] },
              "properties": { "category": "CULTURE", "name": "Glaspaleis" } },
            { "type": "Feature",
              "geometry": { "type": "LineString", "coordinates": [[5.97, 50.88], [5.98, 50.89]] },
              "properties": {} },
            { "type": "Feature", "id": 7,
              "geometry": { "type": "Point", "coordinates": [5.9801, 50.8880] } }
        ]
    }"#;

    #[test]
    fn reads_points_of_interest() {
        let data = GeoJson::from_str(LOCATIONS).unwrap();
        let pois = points_of_interest(&data);

        assert_eq!(pois.len(), 2);
        assert_eq!(
            pois[0],
            PointOfInterest {
                name: Some("Glaspaleis".to_string()),
                ..PointOfInterest::new("glaspaleis", GeoPoint::new(5.9787, 50.8868))
                    .with_category("CULTURE")
            }
        );
        assert_eq!(pois[1], PointOfInterest::new("7", GeoPoint::new(5.9801, 50.8880)));
    }

    #[test]
    fn empty_polygon_serializes_with_one_empty_ring() {
        let json = serde_json::to_value(GeoJson::from(GeoJsonFeature::empty_polygon())).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["geometry"]["coordinates"], serde_json::json!([[]]));
    }

    #[test]
    fn invalid_geojson_is_a_parse_error() {
        assert!(matches!(
            GeoJson::from_str(r#"{"type":"Nope"}"#),
            Err(crate::MapError::ParseError(_))
        ));
    }
}
