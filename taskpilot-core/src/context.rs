use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub code: String,
}

impl Company {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Cached reference data used to enrich the generation prompt.
///
/// Advisory only: nothing here is checked against the records it helps produce.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    pub companies: Vec<Company>,

    #[serde(default)]
    pub status_labels: Option<Vec<String>>,
    #[serde(default)]
    pub priority_labels: Option<Vec<String>>,
}

impl BusinessContext {
    pub fn with_companies(companies: Vec<Company>) -> Self {
        Self {
            companies,
            ..Default::default()
        }
    }

    pub fn with_labels(
        mut self,
        status_labels: Option<Vec<String>>,
        priority_labels: Option<Vec<String>>,
    ) -> Self {
        self.status_labels = status_labels.filter(|v| !v.is_empty());
        self.priority_labels = priority_labels.filter(|v| !v.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
