use crate::global_variables::*;

/// A named scalar written as one column of a post-processing file.
#[derive(Clone, Debug, PartialEq)]
pub struct PostResult {
    pub name: String,
    pub label: String,
    pub value: Float,
    pub unit: Option<String>,
}

impl PostResult {
    pub fn new(name: &str, label: &str, value: Float, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value,
            unit: unit.map(str::to_string),
        }
    }
}
