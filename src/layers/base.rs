use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Style layer kinds the subsystem adds to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Fill,
    Line,
    FillExtrusion,
    Symbol,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Fill => write!(f, "fill"),
            LayerType::Line => write!(f, "line"),
            LayerType::FillExtrusion => write!(f, "fill-extrusion"),
            LayerType::Symbol => write!(f, "symbol"),
        }
    }
}

/// Value of the `visibility` layout property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn to_value(self) -> Value {
        match self {
            Visibility::Visible => Value::from("visible"),
            Visibility::Hidden => Value::from("none"),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "visible" => Some(Visibility::Visible),
            "none" => Some(Visibility::Hidden),
            _ => None,
        }
    }
}

/// A style layer definition handed to the map engine's `addLayer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub source: String,
    #[serde(default)]
    pub paint: Map<String, Value>,
    #[serde(default)]
    pub layout: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, layer_type: LayerType, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer_type,
            source: source.into(),
            paint: Map::new(),
            layout: Map::new(),
        }
    }

    pub fn paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_string(), value.into());
        self
    }

    pub fn layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_string(), value.into());
        self
    }

    pub fn visibility(self, visibility: Visibility) -> Self {
        self.layout("visibility", visibility.to_value())
    }
}
