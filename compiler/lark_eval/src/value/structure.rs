//! Immutable records created by `struct(...)`.

use lark_ir::Name;

use super::Value;

/// Named fields, kept sorted by name.
pub struct StructValue {
    fields: Vec<(Name, Value)>,
}

impl StructValue {
    pub(crate) fn new(mut fields: Vec<(Name, Value)>) -> Self {
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        StructValue { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .binary_search_by(|(field, _)| field.as_str().cmp(name))
            .ok()
            .map(|i| &self.fields[i].1)
    }

    pub fn fields(&self) -> &[(Name, Value)] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &Name> {
        self.fields.iter().map(|(name, _)| name)
    }
}
