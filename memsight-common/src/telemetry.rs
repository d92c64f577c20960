use serde::{Deserialize, Serialize};

/// Display unit of a metric value.
///
/// Serialized with the capitalized names used by monitoring backends
/// (`"Percent"`, `"Bytes"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Percent,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl Unit {
    /// Get the string representation of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Percent => "Percent",
            Unit::Bytes => "Bytes",
            Unit::Kilobytes => "Kilobytes",
            Unit::Megabytes => "Megabytes",
            Unit::Gigabytes => "Gigabytes",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named tag attached to every metric record.
///
/// Both fields are non-empty. [`Dimension::new`] refuses blank input and
/// deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimension")]
pub struct Dimension {
    name: String,
    value: String,
}

/// Unchecked wire form of a [`Dimension`].
#[derive(Deserialize)]
struct RawDimension {
    name: String,
    value: String,
}

impl TryFrom<RawDimension> for Dimension {
    type Error = String;

    fn try_from(raw: RawDimension) -> Result<Self, Self::Error> {
        Dimension::new(raw.name, raw.value)
            .ok_or_else(|| "dimension name and value must not be empty".to_string())
    }
}

impl Dimension {
    /// Create a dimension, returning `None` if the name or value is empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A set of dimensions, unique by name, in insertion order.
///
/// Serialized as a plain list; a list with a repeated name is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Dimension>", try_from = "Vec<Dimension>")]
pub struct DimensionSet(Vec<Dimension>);

impl From<DimensionSet> for Vec<Dimension> {
    fn from(set: DimensionSet) -> Self {
        set.0
    }
}

impl TryFrom<Vec<Dimension>> for DimensionSet {
    type Error = String;

    fn try_from(dimensions: Vec<Dimension>) -> Result<Self, Self::Error> {
        let mut set = DimensionSet::new();
        for dimension in dimensions {
            let name = dimension.name.clone();
            if !set.insert(dimension) {
                return Err(format!("duplicate dimension '{}'", name));
            }
        }
        Ok(set)
    }
}

impl DimensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dimension.
    ///
    /// Returns `false` (and leaves the set unchanged) if a dimension with the
    /// same name is already present.
    pub fn insert(&mut self, dimension: Dimension) -> bool {
        if self.contains(dimension.name()) {
            return false;
        }
        self.0.push(dimension);
        true
    }

    /// Check whether a dimension with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|d| d.name == name)
    }

    /// Look up the value of a dimension by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DimensionSet {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single metric measurement sent to the monitoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Metric name (e.g., "MemoryUtilization").
    pub name: String,

    /// Unix epoch milliseconds when the measurement was taken.
    pub timestamp: i64,

    /// Unit of `value`.
    pub unit: Unit,

    /// The measured value, already converted to `unit`.
    pub value: f64,

    /// Identifying tags.
    #[serde(default, skip_serializing_if = "DimensionSet::is_empty")]
    pub dimensions: DimensionSet,
}

impl MetricRecord {
    /// Create a new metric record without dimensions.
    pub fn new(name: impl Into<String>, timestamp: i64, unit: Unit, value: f64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            unit,
            value,
            dimensions: DimensionSet::new(),
        }
    }

    /// Attach a dimension set to this record.
    pub fn with_dimensions(mut self, dimensions: DimensionSet) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// The payload of one publish: every record of a tick under one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBatch {
    /// Logical grouping of the metrics (e.g., "System/Linux").
    pub namespace: String,

    /// Host that produced the batch.
    pub source: String,

    pub records: Vec<MetricRecord>,
}
