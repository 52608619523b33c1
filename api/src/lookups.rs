use serde::{Deserialize, Serialize};

/// Option lists the forms offer that have no backend endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lookups {
    pub faculties: Vec<String>,
    pub modalities: Vec<String>,
    pub shifts: Vec<String>,
    pub weekdays: Vec<String>,
    pub periods: Vec<String>,
    pub space_types: Vec<String>,
    pub approval_methods: Vec<String>,
    pub class_types: Vec<Labelled>,
    pub class_states: Vec<Labelled>,
    pub price_types: Vec<Labelled>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Labelled {
    pub value: String,
    pub label: String,
}

impl Lookups {
    pub fn from_parsed_json() -> Result<Self, serde_json::Error> {
        let source = include_str!("../../assets/lookups.json");
        serde_json::from_str(source)
    }
}
