use crate::frame::DataFrame;

/// Registry entry pairing a table name with its cached rows
#[derive(Debug, Clone, PartialEq)]
pub struct TableHandle {
    pub name: String,
    pub dataset: DataFrame,
}

impl TableHandle {
    pub fn new(name: impl Into<String>, dataset: DataFrame) -> Self {
        Self {
            name: name.into(),
            dataset,
        }
    }

    /// Returns (row count, column count) of the cached dataset
    pub fn shape(&self) -> (usize, usize) {
        self.dataset.shape()
    }
}
