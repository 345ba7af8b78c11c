//! Catalog snapshot workspace
//!
//! A [`Workspace`] backed by a JSON snapshot of the geodatabase catalog.
//! The snapshot is the metadata exported by the geospatial SDK and lives in
//! the geodatabase directory as `catalog.json`:
//!
//! ```json
//! {
//!   "datasets": [{
//!     "name": "Roads",
//!     "spatial_reference": "WGS_1984_Web_Mercator",
//!     "extent": {"xmin": 0.0, "ymin": 0.0, "xmax": 10.0, "ymax": 10.0},
//!     "feature_classes": [{
//!       "name": "Streets",
//!       "shape_type": "Polyline",
//!       "record_count": 120,
//!       "fields": [{"name": "OBJECTID", "type": "OID"}]
//!     }]
//!   }],
//!   "feature_classes": [],
//!   "tables": [],
//!   "domains": [{"name": "Speed", "domain_type": "Range", "min": 0, "max": 130}],
//!   "relationship_classes": []
//! }
//! ```
//!
//! Any feature class, table, dataset or relationship class may carry an
//! `"unreadable": "<reason>"` entry; describing such an item fails the way a
//! corrupt item fails in the SDK.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::model::{
    CountResult, DatasetDescription, DatasetType, DomainInfo, Extent, FeatureClassDescription,
    FieldInfo, RelationshipDescription, ShapeType, Subtype, TableDescription,
};
use crate::workspace::Workspace;

/// File name of the snapshot inside the geodatabase directory
pub const CATALOG_FILE: &str = "catalog.json";

/// Record count as stored in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordCount {
    /// Plain number
    Number(u64),
    /// Count reported as text
    Text(String),
}

impl Default for RecordCount {
    fn default() -> Self {
        RecordCount::Number(0)
    }
}

impl From<u64> for RecordCount {
    fn from(value: u64) -> Self {
        RecordCount::Number(value)
    }
}

impl From<&str> for RecordCount {
    fn from(value: &str) -> Self {
        RecordCount::Text(value.to_string())
    }
}

/// Subtype entry of a feature class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeEntry {
    /// Subtype code
    pub code: i64,
    /// Subtype definition
    #[serde(flatten)]
    pub subtype: Subtype,
}

/// Feature class entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClassEntry {
    /// Feature class name
    pub name: String,
    /// Geometry type
    pub shape_type: ShapeType,
    /// Fields
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    /// Number of records
    #[serde(default)]
    pub record_count: RecordCount,
    /// Relationship classes this feature class takes part in
    #[serde(default)]
    pub relationship_classes: Vec<String>,
    /// Subtypes in code order
    #[serde(default)]
    pub subtypes: Vec<SubtypeEntry>,
    /// Reason the feature class cannot be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,
}

impl FeatureClassEntry {
    /// Create an empty feature class
    pub fn new(name: impl Into<String>, shape_type: ShapeType) -> Self {
        Self {
            name: name.into(),
            shape_type,
            fields: Vec::new(),
            record_count: RecordCount::default(),
            relationship_classes: Vec::new(),
            subtypes: Vec::new(),
            unreadable: None,
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the record count
    pub fn with_record_count(mut self, count: impl Into<RecordCount>) -> Self {
        self.record_count = count.into();
        self
    }

    /// Take part in a relationship class
    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationship_classes.push(name.into());
        self
    }

    /// Append a subtype
    pub fn with_subtype(
        mut self,
        code: i64,
        subtype_field: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.subtypes.push(SubtypeEntry {
            code,
            subtype: Subtype {
                subtype_field: subtype_field.into(),
                name: name.into(),
            },
        });
        self
    }

    /// Mark the feature class as unreadable
    pub fn unreadable(mut self, reason: impl Into<String>) -> Self {
        self.unreadable = Some(reason.into());
        self
    }
}

/// Dataset entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Dataset name
    pub name: String,
    /// Dataset kind
    #[serde(default = "default_dataset_type")]
    pub dataset_type: DatasetType,
    /// Spatial reference display name
    #[serde(default)]
    pub spatial_reference: String,
    /// Bounding extent
    #[serde(default)]
    pub extent: Extent,
    /// Feature classes inside the dataset
    #[serde(default)]
    pub feature_classes: Vec<FeatureClassEntry>,
    /// Reason the dataset cannot be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,
}

fn default_dataset_type() -> DatasetType {
    DatasetType::FeatureDataset
}

impl DatasetEntry {
    /// Create an empty feature dataset
    pub fn new(
        name: impl Into<String>,
        spatial_reference: impl Into<String>,
        extent: Extent,
    ) -> Self {
        Self {
            name: name.into(),
            dataset_type: DatasetType::FeatureDataset,
            spatial_reference: spatial_reference.into(),
            extent,
            feature_classes: Vec::new(),
            unreadable: None,
        }
    }

    /// Set the dataset kind
    pub fn with_type(mut self, dataset_type: DatasetType) -> Self {
        self.dataset_type = dataset_type;
        self
    }

    /// Add a feature class
    pub fn with_feature_class(mut self, feature_class: FeatureClassEntry) -> Self {
        self.feature_classes.push(feature_class);
        self
    }

    /// Mark the dataset as unreadable
    pub fn unreadable(mut self, reason: impl Into<String>) -> Self {
        self.unreadable = Some(reason.into());
        self
    }
}

/// Table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Table name
    pub name: String,
    /// Fields
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    /// Number of records
    #[serde(default)]
    pub record_count: RecordCount,
    /// Relationship classes this table takes part in
    #[serde(default)]
    pub relationship_classes: Vec<String>,
    /// Reason the table cannot be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,
}

impl TableEntry {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            record_count: RecordCount::default(),
            relationship_classes: Vec::new(),
            unreadable: None,
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the record count
    pub fn with_record_count(mut self, count: impl Into<RecordCount>) -> Self {
        self.record_count = count.into();
        self
    }

    /// Take part in a relationship class
    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationship_classes.push(name.into());
        self
    }

    /// Mark the table as unreadable
    pub fn unreadable(mut self, reason: impl Into<String>) -> Self {
        self.unreadable = Some(reason.into());
        self
    }
}

/// Relationship class entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    /// Relationship definition
    #[serde(flatten)]
    pub description: RelationshipDescription,
    /// Reason the relationship class cannot be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,
}

impl From<RelationshipDescription> for RelationshipEntry {
    fn from(description: RelationshipDescription) -> Self {
        Self {
            description,
            unreadable: None,
        }
    }
}

/// Complete catalog of a geodatabase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Dataset containers
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
    /// Feature classes outside of any dataset
    #[serde(default)]
    pub feature_classes: Vec<FeatureClassEntry>,
    /// Non-spatial tables
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    /// Domains
    #[serde(default)]
    pub domains: Vec<DomainInfo>,
    /// Relationship classes
    #[serde(default)]
    pub relationship_classes: Vec<RelationshipEntry>,
}

impl CatalogSnapshot {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Add a dataset
    pub fn with_dataset(mut self, dataset: DatasetEntry) -> Self {
        self.datasets.push(dataset);
        self
    }

    /// Add a feature class outside of any dataset
    pub fn with_feature_class(mut self, feature_class: FeatureClassEntry) -> Self {
        self.feature_classes.push(feature_class);
        self
    }

    /// Add a table
    pub fn with_table(mut self, table: TableEntry) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a domain
    pub fn with_domain(mut self, domain: DomainInfo) -> Self {
        self.domains.push(domain);
        self
    }

    /// Add a relationship class
    pub fn with_relationship(mut self, relationship: impl Into<RelationshipEntry>) -> Self {
        self.relationship_classes.push(relationship.into());
        self
    }

    fn dataset(&self, name: &str) -> Result<&DatasetEntry> {
        self.datasets
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::not_found("dataset", name))
    }

    /// Find a feature class and the dataset that owns it
    fn feature_class(&self, name: &str) -> Option<(Option<&DatasetEntry>, &FeatureClassEntry)> {
        let standalone = self
            .feature_classes
            .iter()
            .find(|fc| fc.name.eq_ignore_ascii_case(name))
            .map(|fc| (None, fc));

        standalone.or_else(|| {
            self.datasets.iter().find_map(|d| {
                d.feature_classes
                    .iter()
                    .find(|fc| fc.name.eq_ignore_ascii_case(name))
                    .map(|fc| (Some(d), fc))
            })
        })
    }

    fn table(&self, name: &str) -> Option<&TableEntry> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Workspace over a [`CatalogSnapshot`]
#[derive(Debug, Clone)]
pub struct CatalogWorkspace {
    path: PathBuf,
    snapshot: CatalogSnapshot,
}

impl CatalogWorkspace {
    /// Open the geodatabase the environment is bound to
    pub fn open(env: &Environment) -> Result<Self> {
        let path = &env.workspace;
        if !path.is_dir() {
            return Err(Error::Workspace(format!(
                "'{}' is not a geodatabase directory",
                path.display()
            )));
        }

        let catalog_path = path.join(CATALOG_FILE);
        let text = fs::read_to_string(&catalog_path).map_err(|e| {
            Error::Workspace(format!(
                "Failed to read catalog '{}': {}",
                catalog_path.display(),
                e
            ))
        })?;

        let snapshot = CatalogSnapshot::from_json(&text)?;
        log::debug!(
            "loaded catalog with {} datasets, {} tables, {} domains",
            snapshot.datasets.len(),
            snapshot.tables.len(),
            snapshot.domains.len()
        );

        Ok(Self::from_snapshot(path.clone(), snapshot))
    }

    /// Bind an in-memory snapshot to a path
    pub fn from_snapshot(path: impl Into<PathBuf>, snapshot: CatalogSnapshot) -> Self {
        Self {
            path: path.into(),
            snapshot,
        }
    }

    /// The underlying snapshot
    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn readable_feature_class(
        &self,
        name: &str,
    ) -> Result<(Option<&DatasetEntry>, &FeatureClassEntry)> {
        let (dataset, fc) = self
            .snapshot
            .feature_class(name)
            .ok_or_else(|| Error::not_found("feature class", name))?;
        check_readable(&fc.name, fc.unreadable.as_deref())?;
        Ok((dataset, fc))
    }

    fn readable_table(&self, name: &str) -> Result<&TableEntry> {
        let table = self
            .snapshot
            .table(name)
            .ok_or_else(|| Error::not_found("table", name))?;
        check_readable(&table.name, table.unreadable.as_deref())?;
        Ok(table)
    }
}

fn check_readable(name: &str, unreadable: Option<&str>) -> Result<()> {
    match unreadable {
        Some(reason) => Err(Error::Unreadable {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Compile an SDK-style wildcard into an anchored, case-insensitive regex
fn compile_wildcard(wildcard: &str) -> Result<Regex> {
    let wildcard = if wildcard.is_empty() { "*" } else { wildcard };

    let mut pattern = String::from("(?i)^");
    for ch in wildcard.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');

    Ok(Regex::new(&pattern)?)
}

fn matching<'a>(wildcard: &str, names: impl Iterator<Item = &'a str>) -> Result<Vec<String>> {
    let re = compile_wildcard(wildcard)?;
    Ok(names
        .filter(|name| re.is_match(name))
        .map(str::to_string)
        .collect())
}

fn count_of(record_count: &RecordCount) -> CountResult {
    match record_count {
        RecordCount::Number(n) => CountResult::from(*n),
        RecordCount::Text(text) => CountResult::new(text.clone()),
    }
}

impl Workspace for CatalogWorkspace {
    fn path(&self) -> &Path {
        &self.path
    }

    fn list_datasets(&self, wildcard: &str, kind: Option<DatasetType>) -> Result<Vec<String>> {
        let names = self
            .snapshot
            .datasets
            .iter()
            .filter(|d| kind.map_or(true, |k| d.dataset_type == k))
            .map(|d| d.name.as_str());
        matching(wildcard, names)
    }

    fn list_feature_classes(&self, wildcard: &str, dataset: &str) -> Result<Vec<String>> {
        if dataset.is_empty() {
            return matching(
                wildcard,
                self.snapshot.feature_classes.iter().map(|fc| fc.name.as_str()),
            );
        }

        let entry = self.snapshot.dataset(dataset)?;
        check_readable(&entry.name, entry.unreadable.as_deref())?;
        matching(wildcard, entry.feature_classes.iter().map(|fc| fc.name.as_str()))
    }

    fn list_tables(&self, wildcard: &str) -> Result<Vec<String>> {
        matching(wildcard, self.snapshot.tables.iter().map(|t| t.name.as_str()))
    }

    fn list_fields(&self, name: &str) -> Result<Vec<FieldInfo>> {
        if let Some(table) = self.snapshot.table(name) {
            check_readable(&table.name, table.unreadable.as_deref())?;
            return Ok(table.fields.clone());
        }
        let (_, fc) = self.readable_feature_class(name)?;
        Ok(fc.fields.clone())
    }

    fn describe_dataset(&self, name: &str) -> Result<DatasetDescription> {
        let entry = self.snapshot.dataset(name)?;
        check_readable(&entry.name, entry.unreadable.as_deref())?;
        Ok(DatasetDescription {
            dataset_type: entry.dataset_type,
            spatial_reference: entry.spatial_reference.clone(),
            extent: entry.extent,
        })
    }

    fn describe_feature_class(&self, name: &str) -> Result<FeatureClassDescription> {
        let (dataset, fc) = self.readable_feature_class(name)?;
        Ok(FeatureClassDescription {
            name: fc.name.clone(),
            dataset: dataset.map(|d| d.name.clone()),
            shape_type: fc.shape_type,
            relationship_class_names: fc.relationship_classes.clone(),
        })
    }

    fn describe_table(&self, name: &str) -> Result<TableDescription> {
        let table = self.readable_table(name)?;
        Ok(TableDescription {
            fields: table.fields.clone(),
            relationship_class_names: table.relationship_classes.clone(),
        })
    }

    fn describe_relationship(&self, name: &str) -> Result<RelationshipDescription> {
        let entry = self
            .snapshot
            .relationship_classes
            .iter()
            .find(|r| r.description.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::not_found("relationship class", name))?;
        check_readable(&entry.description.name, entry.unreadable.as_deref())?;
        Ok(entry.description.clone())
    }

    fn list_domains(&self) -> Result<Vec<DomainInfo>> {
        Ok(self.snapshot.domains.clone())
    }

    fn list_subtypes(&self, feature_class: &str) -> Result<IndexMap<i64, Subtype>> {
        let (_, fc) = self.readable_feature_class(feature_class)?;
        Ok(fc
            .subtypes
            .iter()
            .map(|entry| (entry.code, entry.subtype.clone()))
            .collect())
    }

    fn record_count(&self, name: &str) -> Result<CountResult> {
        if let Some(table) = self.snapshot.table(name) {
            check_readable(&table.name, table.unreadable.as_deref())?;
            return Ok(count_of(&table.record_count));
        }
        let (_, fc) = self.readable_feature_class(name)?;
        Ok(count_of(&fc.record_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    fn sample() -> CatalogWorkspace {
        let snapshot = CatalogSnapshot::new()
            .with_dataset(
                DatasetEntry::new("Roads", "WGS_1984", Extent::default())
                    .with_feature_class(
                        FeatureClassEntry::new("Streets", ShapeType::Polyline)
                            .with_field(FieldInfo::new("OBJECTID", FieldType::OID))
                            .with_record_count(120_u64),
                    )
                    .with_feature_class(
                        FeatureClassEntry::new("Broken", ShapeType::Point).unreadable("bad header"),
                    ),
            )
            .with_dataset(
                DatasetEntry::new("Imagery", "WGS_1984", Extent::default())
                    .with_type(DatasetType::RasterDataset),
            )
            .with_feature_class(FeatureClassEntry::new("Parcels", ShapeType::Polygon))
            .with_table(TableEntry::new("Owners").with_record_count("42"));
        CatalogWorkspace::from_snapshot("city.gdb", snapshot)
    }

    #[test]
    fn test_wildcard_matching() {
        let re = compile_wildcard("st*").unwrap();
        assert!(re.is_match("Streets"));
        assert!(!re.is_match("Roads"));

        let re = compile_wildcard("a?c").unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("abbc"));

        let re = compile_wildcard("a.b").unwrap();
        assert!(re.is_match("a.b"));
        assert!(!re.is_match("axb"));

        assert!(compile_wildcard("").unwrap().is_match("anything"));
    }

    #[test]
    fn test_list_datasets_by_kind() {
        let ws = sample();
        assert_eq!(ws.list_datasets("*", None).unwrap(), vec!["Roads", "Imagery"]);
        assert_eq!(
            ws.list_datasets("*", Some(DatasetType::FeatureDataset)).unwrap(),
            vec!["Roads"]
        );
    }

    #[test]
    fn test_list_feature_classes() {
        let ws = sample();
        assert_eq!(ws.list_feature_classes("*", "").unwrap(), vec!["Parcels"]);
        assert_eq!(
            ws.list_feature_classes("*", "Roads").unwrap(),
            vec!["Streets", "Broken"]
        );
        assert!(matches!(
            ws.list_feature_classes("*", "Nowhere"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_unreadable_feature_class() {
        let ws = sample();
        assert!(matches!(
            ws.describe_feature_class("Broken"),
            Err(Error::Unreadable { .. })
        ));
        assert!(ws.list_fields("Broken").is_err());
        assert!(ws.record_count("Broken").is_err());
    }

    #[test]
    fn test_describe_feature_class_reports_dataset() {
        let ws = sample();
        let desc = ws.describe_feature_class("streets").unwrap();
        assert_eq!(desc.dataset.as_deref(), Some("Roads"));
        assert_eq!(desc.shape_type, ShapeType::Polyline);
    }

    #[test]
    fn test_record_counts() {
        let ws = sample();
        assert_eq!(ws.record_count("Streets").unwrap().as_str(), "120");
        assert_eq!(ws.record_count("Owners").unwrap().as_str(), "42");
    }

    #[test]
    fn test_snapshot_from_json() {
        let snapshot = CatalogSnapshot::from_json(
            r#"{
                "tables": [{"name": "Owners", "record_count": "7",
                            "fields": [{"name": "NAME", "alias": "Owner name", "type": "String"}]}],
                "relationship_classes": [{
                    "name": "ParcelOwners",
                    "origin_class_names": ["Parcels"],
                    "destination_class_names": ["Owners"],
                    "origin_primary_key": "OBJECTID",
                    "origin_foreign_key": "parcel_id",
                    "cardinality": "OneToMany"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.tables[0].record_count, RecordCount::Text("7".into()));
        assert_eq!(snapshot.tables[0].fields[0].alias, "Owner name");
        assert_eq!(snapshot.relationship_classes[0].description.name, "ParcelOwners");
        assert!(snapshot.relationship_classes[0].unreadable.is_none());
    }

    #[test]
    fn test_open_missing_directory() {
        let env = Environment::new("/definitely/not/here.gdb");
        assert!(matches!(
            CatalogWorkspace::open(&env),
            Err(Error::Workspace(_))
        ));
    }
}
