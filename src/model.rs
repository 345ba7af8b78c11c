//! Geodatabase metadata views
//!
//! Read-only descriptions of the objects found in a geodatabase. They are
//! produced fresh by a [`Workspace`](crate::workspace::Workspace) on every
//! call and never mutated by the report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of a dataset container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetType {
    /// Container of feature classes sharing a spatial reference
    FeatureDataset,
    /// Raster dataset
    RasterDataset,
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetType::FeatureDataset => write!(f, "FeatureDataset"),
            DatasetType::RasterDataset => write!(f, "RasterDataset"),
        }
    }
}

/// Bounding rectangle of a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Minimum x
    pub xmin: f64,
    /// Minimum y
    pub ymin: f64,
    /// Maximum x
    pub xmax: f64,
    /// Maximum y
    pub ymax: f64,
}

/// Description of a dataset container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescription {
    /// Dataset kind
    pub dataset_type: DatasetType,
    /// Display name of the spatial reference
    pub spatial_reference: String,
    /// Bounding extent
    pub extent: Extent,
}

/// Geometry type of a feature class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    /// Single points
    Point,
    /// Point clouds
    Multipoint,
    /// Lines
    Polyline,
    /// Areas
    Polygon,
    /// 3D multipatches
    MultiPatch,
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeType::Point => "Point",
            ShapeType::Multipoint => "Multipoint",
            ShapeType::Polyline => "Polyline",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPatch => "MultiPatch",
        };
        f.write_str(name)
    }
}

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Object identifier
    OID,
    /// Shape column
    Geometry,
    /// 16-bit integer
    SmallInteger,
    /// 32-bit integer
    Integer,
    /// 32-bit float
    Single,
    /// 64-bit float
    Double,
    /// Text
    String,
    /// Date and time
    Date,
    /// Binary large object
    Blob,
    /// Raster column
    Raster,
    /// Globally unique identifier
    GUID,
    /// Geodatabase-managed global id
    GlobalID,
    /// XML document
    XML,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A column on a feature class or table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Alias shown to users
    #[serde(default)]
    pub alias: String,
    /// Storage type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Associated domain, if any
    #[serde(default)]
    pub domain: Option<String>,
}

impl FieldInfo {
    /// Create a field whose alias equals its name
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            field_type,
            domain: None,
        }
    }

    /// Set the alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Attach a domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Description of a feature class
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClassDescription {
    /// Feature class name
    pub name: String,
    /// Owning dataset, if any
    pub dataset: Option<String>,
    /// Geometry type
    pub shape_type: ShapeType,
    /// Relationship classes the feature class takes part in
    pub relationship_class_names: Vec<String>,
}

/// Description of a non-spatial table
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescription {
    /// Fields of the table
    pub fields: Vec<FieldInfo>,
    /// Relationship classes the table takes part in
    pub relationship_class_names: Vec<String>,
}

/// A domain code or bound
///
/// Rendered the way the SDK renders scalar values: whole floats keep a
/// trailing `.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
}

impl fmt::Display for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainValue::Integer(v) => write!(f, "{}", v),
            DomainValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            DomainValue::Float(v) => write!(f, "{}", v),
            DomainValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for DomainValue {
    fn from(value: i64) -> Self {
        DomainValue::Integer(value)
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        DomainValue::Float(value)
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        DomainValue::Text(value.to_string())
    }
}

/// One code of a coded-value domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedValue {
    /// Stored code
    pub code: DomainValue,
    /// Description shown for the code
    pub name: String,
}

/// Rule set of a domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain_type")]
pub enum DomainKind {
    /// Enumerated list of codes
    CodedValue {
        /// Codes in provider order
        coded_values: Vec<CodedValue>,
    },
    /// Numeric range
    Range {
        /// Lower bound
        min: DomainValue,
        /// Upper bound
        max: DomainValue,
    },
    /// Any kind the report does not know how to print
    #[serde(other)]
    Unsupported,
}

/// A named validation domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    /// Domain name
    pub name: String,
    /// Domain rules
    #[serde(flatten)]
    pub kind: DomainKind,
}

/// One subtype of a feature class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtype {
    /// Field that stores the subtype code; empty when none is configured
    #[serde(default)]
    pub subtype_field: String,
    /// Subtype name
    pub name: String,
}

/// Cardinality of a relationship class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// 1:1
    OneToOne,
    /// 1:M
    OneToMany,
    /// M:N
    ManyToMany,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Description of a relationship class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDescription {
    /// Relationship class name
    pub name: String,
    /// Origin tables; the first one is reported
    pub origin_class_names: Vec<String>,
    /// Destination tables; the first one is reported
    pub destination_class_names: Vec<String>,
    /// Key on the origin table
    pub origin_primary_key: String,
    /// Key on the destination table referencing the origin
    pub origin_foreign_key: String,
    /// Cardinality
    pub cardinality: Cardinality,
}

/// Record count as handed back by the provider
///
/// Providers return an opaque count object; its text form is parsed back
/// into an integer before it is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResult(String);

impl CountResult {
    /// Wrap the provider's textual count
    pub fn new(text: impl Into<String>) -> Self {
        CountResult(text.into())
    }

    /// Raw text of the count
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalize the count to an integer
    pub fn as_integer(&self) -> Result<u64> {
        self.0
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidCount(self.0.clone()))
    }
}

impl From<u64> for CountResult {
    fn from(value: u64) -> Self {
        CountResult(value.to_string())
    }
}

impl fmt::Display for CountResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_value_display() {
        assert_eq!(DomainValue::Integer(3).to_string(), "3");
        assert_eq!(DomainValue::Float(100.0).to_string(), "100.0");
        assert_eq!(DomainValue::Float(0.25).to_string(), "0.25");
        assert_eq!(DomainValue::Text("RES".into()).to_string(), "RES");
    }

    #[test]
    fn test_count_normalization() {
        assert_eq!(CountResult::new("120").as_integer().unwrap(), 120);
        assert_eq!(CountResult::new(" 7\n").as_integer().unwrap(), 7);
        assert!(matches!(
            CountResult::new("many").as_integer(),
            Err(Error::InvalidCount(_))
        ));
    }

    #[test]
    fn test_domain_kind_deserialize() {
        let coded: DomainInfo = serde_json::from_str(
            r#"{"name": "RoadClass", "domain_type": "CodedValue",
                "coded_values": [{"code": 1, "name": "Highway"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            coded.kind,
            DomainKind::CodedValue { ref coded_values } if coded_values.len() == 1
        ));

        let range: DomainInfo = serde_json::from_str(
            r#"{"name": "Speed", "domain_type": "Range", "min": 0, "max": 130.5}"#,
        )
        .unwrap();
        assert_eq!(
            range.kind,
            DomainKind::Range {
                min: DomainValue::Integer(0),
                max: DomainValue::Float(130.5)
            }
        );

        let other: DomainInfo =
            serde_json::from_str(r#"{"name": "Odd", "domain_type": "Glob"}"#).unwrap();
        assert_eq!(other.kind, DomainKind::Unsupported);
    }

    #[test]
    fn test_field_builder() {
        let field = FieldInfo::new("ROAD_CLASS", FieldType::SmallInteger)
            .with_alias("Road class")
            .with_domain("RoadClass");
        assert_eq!(field.alias, "Road class");
        assert_eq!(field.domain.as_deref(), Some("RoadClass"));
        assert_eq!(field.field_type.to_string(), "SmallInteger");
    }
}
