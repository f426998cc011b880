use serde::Serialize;
use std::slice;

/// String literals in the order they were met, one entry per occurrence.
/// Equal texts are not merged: each occurrence has its own label.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StringPool {
    entries: Vec<StringConstant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringConstant {
    pub label: String,
    pub value: String,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, label: String, value: S) {
        self.entries.push(StringConstant {
            label,
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, StringConstant> {
        self.entries.iter()
    }
}
