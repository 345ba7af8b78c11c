//! Geodatabase schema report
//!
//! [`ReportGenerator`] walks the metadata categories of a workspace in a
//! fixed order and writes one fixed-width text report:
//!
//! 1. feature datasets
//! 2. feature classes
//! 3. feature class fields
//! 4. tables
//! 5. table fields
//! 6. domains
//! 7. subtypes
//! 8. relationships
//!
//! Every section re-enumerates the workspace on its own. An item that
//! cannot be described is logged and left out of the report; the section
//! and the sections after it carry on. Only failures to write the report
//! itself abort a run.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::catalog::CatalogWorkspace;
use crate::env::Environment;
use crate::error::{settle, Error, ItemContext, ItemFailure, ItemResult, Result};
use crate::layout::{fixed, underline, Cell, LastSeen, RowFormat};
use crate::model::{DatasetType, DomainKind, FieldInfo, Subtype};
use crate::workspace::{Workspace, ALL};

/// Width of the `=` rule under most section titles
pub const RULE_WIDTH: usize = 78;

const DATASETS: RowFormat<'static> = RowFormat::new(&[Some(30), Some(30), Some(30), Some(70)]);
const FEATURE_CLASSES: RowFormat<'static> =
    RowFormat::new(&[Some(30), Some(30), Some(10), Some(6), Some(7)]);
const FEATURE_CLASS_FIELDS: RowFormat<'static> =
    RowFormat::new(&[Some(25), Some(25), Some(30), Some(30), Some(15), None]);
const TABLES: RowFormat<'static> = RowFormat::new(&[Some(30), Some(10), Some(10)]);
const TABLE_FIELDS: RowFormat<'static> =
    RowFormat::new(&[Some(30), Some(30), Some(30), Some(15), None]);
const DOMAINS: RowFormat<'static> = RowFormat::new(&[Some(30), Some(10), Some(40)]);
const SUBTYPES: RowFormat<'static> =
    RowFormat::new(&[Some(20), Some(20), Some(20), Some(5), Some(20)]);
const RELATIONSHIPS: RowFormat<'static> =
    RowFormat::new(&[Some(50), Some(30), Some(30), Some(30), Some(30), Some(20)]);

/// Rule drawn under a section title
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// [`RULE_WIDTH`] `=` characters
    Full,
    /// As many `=` as the title is long
    Title,
}

/// Line-oriented UTF-8 writer for the report
struct ReportWriter<'o, O: Write> {
    out: &'o mut O,
}

impl<'o, O: Write> ReportWriter<'o, O> {
    fn new(out: &'o mut O) -> Self {
        Self { out }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn blank(&mut self) -> Result<()> {
        self.line("")
    }

    /// Title, rule and column headers of a section
    fn section(
        &mut self,
        title: &str,
        rule: Rule,
        format: &RowFormat<'_>,
        headers: &[&str],
        separators: &[String],
    ) -> Result<()> {
        let rule = match rule {
            Rule::Full => "=".repeat(RULE_WIDTH),
            Rule::Title => "=".repeat(title.chars().count()),
        };

        self.line(title)?;
        self.line(&rule)?;
        self.blank()?;
        self.line(&format.text_row(headers))?;

        let separators: Vec<&str> = separators.iter().map(String::as_str).collect();
        self.line(&format.text_row(&separators))
    }

    /// Section preceded by a blank line
    fn next_section(
        &mut self,
        title: &str,
        rule: Rule,
        format: &RowFormat<'_>,
        headers: &[&str],
        separators: &[String],
    ) -> Result<()> {
        self.blank()?;
        self.section(title, rule, format, headers, separators)
    }
}

struct FeatureClassRow {
    dataset: String,
    name: String,
    shape_type: String,
    field_count: usize,
    record_count: u64,
}

struct RelationshipRow {
    name: String,
    origin_table: String,
    origin_key: String,
    destination_table: String,
    destination_key: String,
    cardinality: String,
}

/// Feature classes of one dataset; the empty dataset name holds the
/// feature classes outside of any dataset
type FeatureClassGroup = (String, Vec<String>);

/// Writes the schema report of one geodatabase
#[derive(Debug)]
pub struct ReportGenerator<W: Workspace> {
    workspace: W,
    env: Environment,
}

impl ReportGenerator<CatalogWorkspace> {
    /// Bind the environment and open its geodatabase
    ///
    /// Failing to open the data source is fatal.
    pub fn open(env: Environment) -> Result<Self> {
        log::info!("Setting environment ...");
        let workspace = CatalogWorkspace::open(&env)?;
        Ok(Self::new(workspace, env))
    }
}

impl<W: Workspace> ReportGenerator<W> {
    /// Create a generator over an already opened workspace
    pub fn new(workspace: W, env: Environment) -> Self {
        Self { workspace, env }
    }

    /// Path of the report file
    pub fn report_path(&self) -> PathBuf {
        self.env.report_path()
    }

    /// Write the report file and return its path
    pub fn process(&self) -> Result<PathBuf> {
        let path = self.report_path();
        if !self.env.overwrite_output && path.exists() {
            return Err(Error::ReportExists(path));
        }

        log::info!("Writing report {}", path.display());
        let mut out = BufWriter::new(File::create(&path)?);
        self.render(&mut out)?;
        out.flush()?;

        Ok(path)
    }

    /// Render the whole report into `out`
    pub fn render<O: Write>(&self, out: &mut O) -> Result<()> {
        let mut report = ReportWriter::new(out);

        report.line(&format!("Geodatabase: {}", self.workspace.path().display()))?;
        report.blank()?;

        self.feature_datasets(&mut report)?;
        self.feature_classes(&mut report)?;
        self.feature_class_fields(&mut report)?;
        self.tables(&mut report)?;
        self.table_fields(&mut report)?;
        self.domains(&mut report)?;
        self.subtypes(&mut report)?;
        self.relationships(&mut report)?;

        Ok(())
    }

    fn feature_datasets<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing datasets");

        let headers = ["Dataset Name", "Dataset Type", "Spatial Reference", "Extent"];
        report.section("FEATURE DATASETS:", Rule::Full, &DATASETS, &headers, &underline(&headers))?;

        let names = self.list_or_log("datasets", self.workspace.list_datasets(ALL, None));
        let rows = settle(names.iter().map(|name| -> ItemResult<[String; 4]> {
            let desc = self.workspace.describe_dataset(name).for_item(name)?;
            let extent = [desc.extent.xmin, desc.extent.ymin, desc.extent.xmax, desc.extent.ymax]
                .iter()
                .map(|v| fixed(*v, 12, 3))
                .collect::<Vec<_>>()
                .join(" ");
            Ok([
                name.clone(),
                desc.dataset_type.to_string(),
                desc.spatial_reference,
                extent,
            ])
        }));

        for row in &rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            report.line(&DATASETS.text_row(&cells))?;
        }
        Ok(())
    }

    fn feature_classes<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing feature classes");

        let headers = [
            "Feature Dataset",
            "Feature Class",
            "Geometry",
            "Fields Count",
            "Records Count",
        ];
        report.next_section(
            "FEATURE CLASSES:",
            Rule::Full,
            &FEATURE_CLASSES,
            &headers,
            &underline(&headers),
        )?;

        let groups = self.feature_class_groups();
        let candidates = groups
            .iter()
            .flat_map(|(dataset, classes)| classes.iter().map(move |fc| (dataset, fc)));

        let rows = settle(candidates.map(|(dataset, fc)| -> ItemResult<FeatureClassRow> {
            let desc = self.workspace.describe_feature_class(fc).for_item(fc)?;
            let field_count = self.workspace.list_fields(fc).for_item(fc)?.len();
            let record_count = self
                .workspace
                .record_count(fc)
                .and_then(|count| count.as_integer())
                .for_item(fc)?;
            Ok(FeatureClassRow {
                dataset: dataset.clone(),
                name: fc.clone(),
                shape_type: desc.shape_type.to_string(),
                field_count,
                record_count,
            })
        }));

        let mut seen = LastSeen::new();
        for row in &rows {
            let keys = seen.visible(&[row.dataset.as_str()]);
            report.line(&FEATURE_CLASSES.row(&[
                Cell::Text(keys[0]),
                Cell::Text(&row.name),
                Cell::Text(&row.shape_type),
                Cell::Integer(row.field_count as u64),
                Cell::Integer(row.record_count),
            ]))?;
        }
        Ok(())
    }

    fn feature_class_fields<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing feature classes fields");

        let headers = [
            "Feature Dataset",
            "Feature Class",
            "Field Name",
            "Field Alias",
            "Field Type",
            "Field Domain",
        ];
        report.next_section(
            "FEATURE CLASSES - FIELDS:",
            Rule::Full,
            &FEATURE_CLASS_FIELDS,
            &headers,
            &underline(&headers),
        )?;

        let groups = self.feature_class_groups();
        let candidates = groups
            .iter()
            .flat_map(|(dataset, classes)| classes.iter().map(move |fc| (dataset, fc)));

        let classes = settle(candidates.map(
            |(dataset, fc)| -> ItemResult<(String, String, Vec<FieldInfo>)> {
                let fields = self.workspace.list_fields(fc).for_item(fc)?;
                Ok((dataset.clone(), fc.clone(), fields))
            },
        ));

        let mut seen = LastSeen::new();
        for (dataset, fc, fields) in &classes {
            for field in fields {
                let keys = seen.visible(&[dataset.as_str(), fc.as_str()]);
                let field_type = field.field_type.to_string();
                report.line(&FEATURE_CLASS_FIELDS.text_row(&[
                    keys[0],
                    keys[1],
                    field.name.as_str(),
                    field.alias.as_str(),
                    field_type.as_str(),
                    field.domain.as_deref().unwrap_or(""),
                ]))?;
            }
        }
        Ok(())
    }

    fn tables<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing tables");

        let headers = ["Table Name", "Fields Count", "Records Count"];
        report.next_section("Tables:", Rule::Title, &TABLES, &headers, &underline(&headers))?;

        let names = self.list_or_log("tables", self.workspace.list_tables(ALL));
        let rows = settle(names.iter().map(|table| -> ItemResult<(String, usize, u64)> {
            let field_count = self.workspace.list_fields(table).for_item(table)?.len();
            let record_count = self
                .workspace
                .record_count(table)
                .and_then(|count| count.as_integer())
                .for_item(table)?;
            Ok((table.clone(), field_count, record_count))
        }));

        for (table, field_count, record_count) in &rows {
            report.line(&TABLES.row(&[
                Cell::Text(table),
                Cell::Integer(*field_count as u64),
                Cell::Integer(*record_count),
            ]))?;
        }
        Ok(())
    }

    fn table_fields<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing tables fields");

        let headers = ["Table Name", "Field Name", "Field Alias", "Field Type", "Field Domain"];
        report.next_section(
            "TABLES - FIELDS:",
            Rule::Full,
            &TABLE_FIELDS,
            &headers,
            &underline(&headers),
        )?;

        let names = self.list_or_log("tables", self.workspace.list_tables(ALL));
        let tables = settle(names.iter().map(|table| -> ItemResult<(String, Vec<FieldInfo>)> {
            let desc = self.workspace.describe_table(table).for_item(table)?;
            Ok((table.clone(), desc.fields))
        }));

        let mut seen = LastSeen::new();
        for (table, fields) in &tables {
            for field in fields {
                let keys = seen.visible(&[table.as_str()]);
                let field_type = field.field_type.to_string();
                report.line(&TABLE_FIELDS.text_row(&[
                    keys[0],
                    field.name.as_str(),
                    field.alias.as_str(),
                    field_type.as_str(),
                    field.domain.as_deref().unwrap_or(""),
                ]))?;
            }
        }
        Ok(())
    }

    fn domains<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing domains");

        let headers = ["Domain Name", "Code", "Description"];
        report.next_section("DOMAINS:", Rule::Full, &DOMAINS, &headers, &underline(&headers))?;

        let domains = self.list_or_log("domains", self.workspace.list_domains());

        let mut seen = LastSeen::new();
        for domain in &domains {
            match &domain.kind {
                DomainKind::CodedValue { coded_values } => {
                    for coded in coded_values {
                        let keys = seen.visible(&[domain.name.as_str()]);
                        let code = coded.code.to_string();
                        report.line(&DOMAINS.text_row(&[
                            keys[0],
                            code.as_str(),
                            coded.name.as_str(),
                        ]))?;
                    }
                }
                DomainKind::Range { min, max } => {
                    let keys = seen.visible(&[domain.name.as_str()]);
                    let (min, max) = (min.to_string(), max.to_string());
                    report.line(&DOMAINS.text_row(&[keys[0], min.as_str(), max.as_str()]))?;
                }
                DomainKind::Unsupported => {
                    log::debug!("skipping domain {} of unsupported kind", domain.name);
                }
            }
        }
        Ok(())
    }

    fn subtypes<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing subtypes");

        let headers = ["Feature Dataset", "Feature Class", "Field", "Code", "Description"];
        let separators: Vec<String> = [20, 20, 20, 5, 20].iter().map(|w| "-".repeat(*w)).collect();
        report.next_section("SUBTYPES:", Rule::Full, &SUBTYPES, &headers, &separators)?;

        let groups = self.feature_class_groups();
        let candidates = groups
            .iter()
            .flat_map(|(dataset, classes)| classes.iter().map(move |fc| (dataset, fc)));

        let classes = settle(candidates.map(
            |(dataset, fc)| -> ItemResult<(String, String, IndexMap<i64, Subtype>)> {
                let subtypes = self.workspace.list_subtypes(fc).for_item(fc)?;
                Ok((dataset.clone(), fc.clone(), subtypes))
            },
        ));

        for (dataset, fc, subtypes) in &classes {
            // Only the class's first entry carries the names, even when that
            // entry is skipped for lacking a subtype field
            for (index, (code, subtype)) in subtypes.iter().enumerate() {
                if subtype.subtype_field.is_empty() {
                    continue;
                }

                let code = code.to_string();
                let row = if index == 0 {
                    [dataset.as_str(), fc.as_str(), subtype.subtype_field.as_str()]
                } else {
                    ["", "", ""]
                };
                report.line(&SUBTYPES.text_row(&[
                    row[0],
                    row[1],
                    row[2],
                    code.as_str(),
                    subtype.name.as_str(),
                ]))?;
            }
        }
        Ok(())
    }

    fn relationships<O: Write>(&self, report: &mut ReportWriter<'_, O>) -> Result<()> {
        log::info!("Processing relationships ...");

        let headers = [
            "Relationship Name",
            "Origin Table",
            "Origin Key",
            "Foreign Table",
            "Foreign Key",
            "Cardinality",
        ];
        report.next_section(
            "RELATIONSHIPS:",
            Rule::Full,
            &RELATIONSHIPS,
            &headers,
            &underline(&headers),
        )?;

        let names = self.relationship_class_names();
        let rows = settle(names.iter().map(|name| self.describe_relationship(name)));

        for row in &rows {
            report.line(&RELATIONSHIPS.text_row(&[
                row.name.as_str(),
                row.origin_table.as_str(),
                row.origin_key.as_str(),
                row.destination_table.as_str(),
                row.destination_key.as_str(),
                row.cardinality.as_str(),
            ]))?;
        }
        Ok(())
    }

    /// Distinct relationship class names over every feature class (inside
    /// and outside of feature datasets) and every table
    fn relationship_class_names(&self) -> BTreeSet<String> {
        let mut owners = self.list_or_log(
            "feature classes",
            self.workspace.list_feature_classes(ALL, ""),
        );
        let datasets = self.list_or_log(
            "feature datasets",
            self.workspace.list_datasets(ALL, Some(DatasetType::FeatureDataset)),
        );
        for dataset in &datasets {
            let classes = self.workspace.list_feature_classes(ALL, dataset);
            owners.extend(self.list_or_log(dataset, classes));
        }
        let feature_class_count = owners.len();
        owners.extend(self.list_or_log("tables", self.workspace.list_tables(ALL)));

        let per_owner = settle(owners.iter().enumerate().map(|(i, owner)| {
            if i < feature_class_count {
                self.workspace
                    .describe_feature_class(owner)
                    .map(|d| d.relationship_class_names)
                    .for_item(owner)
            } else {
                self.workspace
                    .describe_table(owner)
                    .map(|d| d.relationship_class_names)
                    .for_item(owner)
            }
        }));

        per_owner.into_iter().flatten().collect()
    }

    fn describe_relationship(&self, name: &str) -> ItemResult<RelationshipRow> {
        let desc = self.workspace.describe_relationship(name).for_item(name)?;

        let origin_table = desc
            .origin_class_names
            .first()
            .ok_or_else(|| ItemFailure::new(name, Error::not_found("origin class of", name)))?;
        let destination_table = desc
            .destination_class_names
            .first()
            .ok_or_else(|| ItemFailure::new(name, Error::not_found("destination class of", name)))?;

        let origin_key = self
            .resolve_key(origin_table, &desc.origin_primary_key)
            .for_item(name)?;
        let destination_key = self
            .resolve_key(destination_table, &desc.origin_foreign_key)
            .for_item(name)?;

        Ok(RelationshipRow {
            name: desc.name.clone(),
            origin_table: origin_table.clone(),
            origin_key,
            destination_table: destination_table.clone(),
            destination_key,
            cardinality: desc.cardinality.to_string(),
        })
    }

    /// Key name as stored on `table`: the key itself when a field matches it
    /// exactly, otherwise its upper-cased form whether or not that matches
    fn resolve_key(&self, table: &str, key: &str) -> Result<String> {
        let fields = self.workspace.list_fields(table)?;
        if fields.iter().any(|f| f.name == key) {
            Ok(key.to_string())
        } else {
            Ok(key.to_uppercase())
        }
    }

    /// Dataset groups in report order: outside of datasets first, then each
    /// dataset
    fn feature_class_groups(&self) -> Vec<FeatureClassGroup> {
        let mut datasets = vec![String::new()];
        datasets.extend(self.list_or_log("datasets", self.workspace.list_datasets(ALL, None)));

        settle(datasets.into_iter().map(|dataset| -> ItemResult<FeatureClassGroup> {
            let classes = self
                .workspace
                .list_feature_classes(ALL, &dataset)
                .for_item(&dataset)?;
            log::debug!("dataset '{}' holds {} feature classes", dataset, classes.len());
            Ok((dataset, classes))
        }))
    }

    /// Unwrap a listing, logging a failure as an empty list
    fn list_or_log<T>(&self, what: &str, listing: Result<Vec<T>>) -> Vec<T> {
        settle(std::iter::once(listing.for_item(what)))
            .into_iter()
            .flatten()
            .collect()
    }
}
