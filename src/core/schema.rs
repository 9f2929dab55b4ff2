//! Static per-family schemas and the generic mapper that applies them.
//!
//! Each family (solar / HV / storage) declares:
//!  - the default sheet layout (where the metadata block ends and the
//!    line-item block starts),
//!  - an ordered `label → canonical column` dictionary for the metadata block,
//!  - the ordered, positional line-item columns.
//!
//! The dictionaries are hand-maintained and do not cover every label a
//! template may contain: unknown labels survive as extra columns unless the
//! mapper runs with `ExtraColumnPolicy::RejectExtra`.

use crate::core::pivot::MISSING_LABEL;
use crate::errors::{AppError, AppResult};
use crate::models::{CellValue, ColumnType, Family, Grid, Record};
use serde::{Deserialize, Serialize};

/// Synthetic identifier column shared by project and line-item tables.
pub const ID_COLUMN: &str = "id";
pub const TRACKER_COLUMN: &str = "Project_Tracker_ID";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub label: &'static str,
    pub column: &'static str,
    pub kind: ColumnType,
}

const fn field(label: &'static str, column: &'static str, kind: ColumnType) -> FieldDef {
    FieldDef {
        label,
        column,
        kind,
    }
}

/// Row offsets of a family template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Metadata block = rows with index `< metadata_rows`.
    pub metadata_rows: usize,
    /// First row (0-based) of the line-item block.
    pub line_items_from: usize,
}

#[derive(Debug)]
pub struct FamilySchema {
    pub family: Family,
    pub layout: SheetLayout,
    pub project_fields: &'static [FieldDef],
    pub line_item_fields: &'static [FieldDef],
}

use ColumnType::{Real, Text, Timestamp};

pub static SOLAR_SCHEMA: FamilySchema = FamilySchema {
    family: Family::Solar,
    layout: SheetLayout {
        metadata_rows: 18,
        line_items_from: 21,
    },
    project_fields: &[
        field("Project Name", "Project_Name", Text),
        field("Project Tracker ID", "Project_Tracker_ID", Text),
        field("Project Type", "Project_Type", Text),
        field("Scenario Name", "Scenario_Name", Text),
        field("Scenario ID", "Scenario_ID", Text),
        field("Estimate Source", "Estimate_Source", Text),
        field("Stage Gate", "Stage_Gate", Text),
        field("Milestone", "Milestone", Text),
        field("Design Package", "Design_Package", Text),
        field("EPE Version", "EPE_Version", Text),
        field("Buildable Land Version", "Buildable_Land_Version", Text),
        field("MW DC", "MW_DC", Real),
        field("MW AC", "MW_AC", Real),
        field("Module Count", "Module_Count", Real),
        field("Tracker Row Count", "Tracker_Row_Count", Real),
        field(
            "Labor (Union/Prevailing/Non-Union)",
            "Labor_Union_Prevailing_Non_Union",
            Text,
        ),
        field("Contractor", "Contractor", Text),
        field("Date Submitted", "Date_Submitted", Timestamp),
    ],
    line_item_fields: &[
        field("Cost Structure", "Cost_Structure", Text),
        field("Description", "Description", Text),
        field("Quantity", "Quantity", Real),
        field("U/M", "U_M", Text),
        field("Unit Rate", "Unit_Rate", Real),
        field("Extended Price", "Extended_Price", Real),
        field("Price per Wp", "Price_per_Wp", Real),
        field("Comments", "Comments", Text),
        field("Typical Inclusions", "Typical_Inclusions", Text),
    ],
};

pub static HV_SCHEMA: FamilySchema = FamilySchema {
    family: Family::Hv,
    layout: SheetLayout {
        metadata_rows: 16,
        line_items_from: 19,
    },
    project_fields: &[
        field("Project Name", "Project_Name", Text),
        field("Project Tracker ID", "Project_Tracker_ID", Text),
        field("Project Type", "Project_Type", Text),
        field("Scenario Name", "Scenario_Name", Text),
        field("Scenario ID", "Scenario_ID", Text),
        field("Estimate Source", "Estimate_Source", Text),
        field("Stage Gate", "Stage_Gate", Text),
        field("Milestone", "Milestone", Text),
        field("Design Package", "Design_Package", Text),
        field("EPE Version", "EPE_Version", Text),
        field("Buildable Land Version", "Buildable_Land_Version", Text),
        field("MW AC", "MW_AC", Real),
        field("Interconnect Voltage", "Interconnect_Voltage", Text),
        field(
            "Labor (Union/Prevailing/Non-Union)",
            "Labor_Union_Prevailing_Non_Union",
            Text,
        ),
        field("Contractor", "Contractor", Text),
        field("Date Submitted", "Date_Submitted", Timestamp),
    ],
    line_item_fields: &[
        field("Cost Structure", "Cost_Structure", Text),
        field("Description", "Description", Text),
        field("Quantity", "Quantity", Real),
        field("U/M", "U_M", Text),
        field("Unit Rate", "Unit_Rate", Real),
        field("Extended Price", "Extended_Price", Real),
        field("Price per Wp", "Price_per_Wp", Real),
        field("Comments", "Comments", Text),
    ],
};

pub static STORAGE_SCHEMA: FamilySchema = FamilySchema {
    family: Family::Storage,
    layout: SheetLayout {
        metadata_rows: 22,
        line_items_from: 25,
    },
    project_fields: &[
        field("Project Name", "Project_Name", Text),
        field("Project Tracker ID", "Project_Tracker_ID", Text),
        field("Project Type", "Project_Type", Text),
        field("Scenario Name", "Scenario_Name", Text),
        field("Scenario ID", "Scenario_ID", Text),
        field("Estimate Source", "Estimate_Source", Text),
        field("Stage Gate", "Stage_Gate", Text),
        field("Milestone", "Milestone", Text),
        field("Design Package", "Design_Package", Text),
        field("EPE Version", "EPE_Version", Text),
        field("Buildable Land Version", "Buildable_Land_Version", Text),
        field("BESS OEM", "BESS_OEM", Text),
        field("Product Type", "Product_Type", Text),
        field("Coupling", "Coupling", Text),
        field("Battery Size at POI[MW]", "Battery_Size_at_POI[MW]", Real),
        field("Discharge Duration[hr]", "Discharge_Duration[hr]", Real),
        field("MWh Installed", "MWh_Installed", Real),
        field("BESS Container Quantity", "BESS_Container_Quantity", Real),
        field("PCS Quantity", "PCS_Quantity", Real),
        field(
            "Labor (Union/Prevailing/Non-Union)",
            "Labor_Union_Prevailing_Non_Union",
            Text,
        ),
        field("Contractor", "Contractor", Text),
        field("Date Submitted", "Date_Submitted", Timestamp),
    ],
    line_item_fields: &[
        field("Cost Structure", "Cost_Structure", Text),
        field("Description", "Description", Text),
        field("Quantity", "Quantity", Real),
        field("U/M", "U_M", Text),
        field("Unit Rate", "Unit_Rate", Real),
        field("Extended Price", "Extended_Price", Real),
        field("Price per kWh", "Price_per_kWh", Real),
        field("Comments", "Comments", Text),
    ],
};

impl Family {
    pub fn schema(&self) -> &'static FamilySchema {
        match self {
            Family::Solar => &SOLAR_SCHEMA,
            Family::Hv => &HV_SCHEMA,
            Family::Storage => &STORAGE_SCHEMA,
        }
    }
}

impl FamilySchema {
    /// Field definition for a sheet label (whitespace-insensitive).
    pub fn field_for_label(&self, label: &str) -> Option<&'static FieldDef> {
        let wanted = normalize_label(label);
        self.project_fields
            .iter()
            .find(|f| normalize_label(f.label) == wanted)
    }

    pub fn is_project_column(&self, column: &str) -> bool {
        column == ID_COLUMN || self.project_fields.iter().any(|f| f.column == column)
    }
}

/// Collapse whitespace runs (including the line breaks some templates put
/// inside labels) to single spaces.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Placeholder column names produced by unlabeled metadata rows.
pub fn is_missing_label(column: &str) -> bool {
    column.trim().eq_ignore_ascii_case(MISSING_LABEL)
}

/// What to do with pivoted labels the family dictionary does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraColumnPolicy {
    /// Keep them as extra columns; the destination table decides later.
    #[default]
    PassThroughExtra,
    /// Fail the mapping with `SchemaMismatch`.
    RejectExtra,
}

/// Outcome of line-item mapping.
#[derive(Debug, Default)]
pub struct LineItems {
    pub records: Vec<Record>,
    /// Rows dropped because their cost-structure cell was blank.
    pub skipped_blank: usize,
}

pub struct SchemaMapper {
    schema: &'static FamilySchema,
    policy: ExtraColumnPolicy,
}

impl SchemaMapper {
    pub fn new(family: Family, policy: ExtraColumnPolicy) -> Self {
        Self {
            schema: family.schema(),
            policy,
        }
    }

    pub fn schema(&self) -> &'static FamilySchema {
        self.schema
    }

    /// Rename pivoted labels to canonical columns.
    pub fn map(&self, record: &Record) -> AppResult<Record> {
        let mut mapped = Record::new();
        let mut rejected = Vec::new();

        for (label, value) in record.iter() {
            let column = match self.schema.field_for_label(label) {
                Some(f) => f.column.to_string(),
                None => {
                    if self.policy == ExtraColumnPolicy::RejectExtra && !is_missing_label(label) {
                        rejected.push(label.to_string());
                    }
                    label.to_string()
                }
            };

            if is_missing_label(&column) {
                continue;
            }

            // two template labels for the same field: the first non-blank wins
            if mapped.get(&column).is_some_and(|v| !v.is_blank()) {
                continue;
            }
            mapped.set(column, value.clone());
        }

        if !rejected.is_empty() {
            return Err(AppError::SchemaMismatch {
                table: self.schema.family.project_table().to_string(),
                columns: rejected,
            });
        }

        Ok(mapped)
    }

    /// Columns of a mapped record that the family schema does not declare.
    pub fn extra_columns(&self, mapped: &Record) -> Vec<String> {
        mapped
            .columns()
            .filter(|c| !self.schema.is_project_column(c))
            .map(str::to_string)
            .collect()
    }

    /// Name line-item columns positionally and drop rows with a blank
    /// cost-structure cell.
    pub fn map_line_items(&self, block: &Grid) -> LineItems {
        let mut out = LineItems::default();

        for row in block.rows() {
            let blank = row.first().is_none_or(CellValue::is_blank);
            if blank {
                out.skipped_blank += 1;
                continue;
            }

            let record: Record = self
                .schema
                .line_item_fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.column, row.get(i).cloned().unwrap_or(CellValue::Empty)))
                .collect();
            out.records.push(record);
        }

        out
    }
}
