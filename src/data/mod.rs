pub mod filters;
pub mod geojson;
pub mod settings;
pub mod storage;

pub use filters::{ChangeOrigin, FilterExpression, FilterStore};
pub use geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry, PointOfInterest};
pub use settings::PerformanceSettings;
pub use storage::{KeyValueStorage, MemoryStorage, StorageEvent};
