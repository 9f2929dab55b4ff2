use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Project family: each one has its own sheet, layout and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Solar,
    Hv,
    Storage,
}

impl Family {
    /// Fixed processing order inside one workbook.
    pub const ALL: [Family; 3] = [Family::Solar, Family::Hv, Family::Storage];

    pub fn code(&self) -> &'static str {
        match self {
            Family::Solar => "solar",
            Family::Hv => "hv",
            Family::Storage => "storage",
        }
    }

    /// Worksheet name inside the SOV workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Family::Solar => "Solar SOV",
            Family::Hv => "HV SOV",
            Family::Storage => "Storage SOV",
        }
    }

    pub fn project_table(&self) -> &'static str {
        match self {
            Family::Solar => "solar_projects",
            Family::Hv => "HV_projects",
            Family::Storage => "storage_projects",
        }
    }

    pub fn sov_table(&self) -> &'static str {
        match self {
            Family::Solar => "solar_sov",
            Family::Hv => "HV_sov",
            Family::Storage => "storage_sov",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
