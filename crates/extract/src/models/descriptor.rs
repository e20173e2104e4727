use crate::consts;
use crate::error::{ErrorKind, Result};
use std::collections::BTreeSet;

/// The fields declared by a mod's embedded `About/About.xml`.
///
/// The four identity fields are guaranteed non-empty: a descriptor without
/// them is not a descriptor. The side tables (tags, dependencies, branches)
/// never contain empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    id: String,
    version: String,
    name: String,
    author: String,
    tags: Vec<String>,
    depends_on: Vec<String>,
    branches: BTreeSet<String>,
}
impl Descriptor {
    /// Construct a descriptor from its required fields.
    ///
    /// Each field is trimmed; a field that ends up empty is reported as
    /// missing, using the descriptor element name.
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            id: required(consts::MOD_ID, id.into())?,
            version: required(consts::VERSION, version.into())?,
            name: required(consts::NAME, name.into())?,
            author: required(consts::AUTHOR, author.into())?,
            tags: Vec::new(),
            depends_on: Vec::new(),
            branches: BTreeSet::new(),
        })
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = non_empty(tags).collect();
        self
    }

    pub fn with_dependencies(mut self, depends_on: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = non_empty(depends_on).collect();
        self
    }

    /// Duplicate branch labels collapse into one.
    pub fn with_branches(mut self, branches: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.branches = non_empty(branches).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Branch labels in sorted order.
    pub fn branches(&self) -> &BTreeSet<String> {
        &self.branches
    }
}

fn required(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        exn::bail!(ErrorKind::MissingField(field));
    }
    Ok(if trimmed.len() == value.len() { value } else { trimmed.to_string() })
}

fn non_empty(values: impl IntoIterator<Item = impl Into<String>>) -> impl Iterator<Item = String> {
    values.into_iter().map(Into::into).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_are_trimmed() {
        let descriptor = Descriptor::new(" foo ", "1.0\n", "Foo", "Bar").unwrap();
        assert_eq!(descriptor.id(), "foo");
        assert_eq!(descriptor.version(), "1.0");
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let err = Descriptor::new("foo", "1.0", "   ", "Bar").unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("Name"));
    }

    #[test]
    fn test_side_tables_drop_empty_values() {
        let descriptor = Descriptor::new("foo", "1.0", "Foo", "Bar")
            .unwrap()
            .with_tags(["QoL", " ", ""])
            .with_dependencies(["", "core"])
            .with_branches(["stable", "beta", "stable", ""]);
        assert_eq!(descriptor.tags(), &["QoL".to_string()]);
        assert_eq!(descriptor.depends_on(), &["core".to_string()]);
        assert_eq!(descriptor.branches().iter().collect::<Vec<_>>(), vec!["beta", "stable"]);
    }
}
