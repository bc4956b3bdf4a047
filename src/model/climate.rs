//! Climate selection. Only the choice of dataset is held here; reading the
//! weather file itself happens elsewhere.

use serde::{Deserialize, Serialize};

/// Where the climate data for a run comes from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClimateSource {
    #[default]
    None,
    /// A dataset shipped with the application.
    Builtin { name: String },
    /// A user-uploaded file, identified by name and format (e.g. "epw", "wac").
    Uploaded { file_name: String, format: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClimateSelection {
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: ClimateSource,
}

impl ClimateSelection {
    pub fn builtin(location: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            location_name: location.into(),
            source: ClimateSource::Builtin {
                name: dataset.into(),
            },
            ..Self::default()
        }
    }

    pub fn is_selected(&self) -> bool {
        self.source != ClimateSource::None
    }
}
