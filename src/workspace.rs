//! Geodatabase metadata provider
//!
//! [`Workspace`] is the narrow interface the report needs from a geospatial
//! SDK: listing, describing and counting. Everything the report prints comes
//! through it, so the report can run against any implementation, including
//! the in-memory [`CatalogSnapshot`](crate::catalog::CatalogSnapshot).

use std::path::Path;

use indexmap::IndexMap;

use crate::error::Result;
use crate::model::{
    CountResult, DatasetDescription, DatasetType, DomainInfo, FeatureClassDescription, FieldInfo,
    RelationshipDescription, Subtype, TableDescription,
};

/// Wildcard matching every name
pub const ALL: &str = "*";

/// An open geodatabase
///
/// Wildcards use `*` for any run of characters and `?` for a single
/// character and match case-insensitively. An empty wildcard matches
/// everything.
pub trait Workspace {
    /// Path the workspace is bound to
    fn path(&self) -> &Path;

    /// List dataset names, optionally restricted to one dataset kind
    fn list_datasets(&self, wildcard: &str, kind: Option<DatasetType>) -> Result<Vec<String>>;

    /// List feature classes inside `dataset`; an empty dataset name lists
    /// the feature classes outside of any dataset
    fn list_feature_classes(&self, wildcard: &str, dataset: &str) -> Result<Vec<String>>;

    /// List non-spatial tables
    fn list_tables(&self, wildcard: &str) -> Result<Vec<String>>;

    /// List the fields of a feature class or table
    fn list_fields(&self, name: &str) -> Result<Vec<FieldInfo>>;

    /// Describe a dataset
    fn describe_dataset(&self, name: &str) -> Result<DatasetDescription>;

    /// Describe a feature class
    fn describe_feature_class(&self, name: &str) -> Result<FeatureClassDescription>;

    /// Describe a table
    fn describe_table(&self, name: &str) -> Result<TableDescription>;

    /// Describe a relationship class
    fn describe_relationship(&self, name: &str) -> Result<RelationshipDescription>;

    /// List every domain of the workspace
    fn list_domains(&self) -> Result<Vec<DomainInfo>>;

    /// Subtype code to definition mapping of a feature class
    fn list_subtypes(&self, feature_class: &str) -> Result<IndexMap<i64, Subtype>>;

    /// Count the records of a feature class or table
    fn record_count(&self, name: &str) -> Result<CountResult>;
}
