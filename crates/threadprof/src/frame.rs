use std::fmt;

/// A single captured stack location.
///
/// Equality and hashing are structural over all four fields, so two frames
/// captured independently at the same location collapse to one entry in maps
/// keyed by frames or by whole stacks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Frame {
    /// The type (module, class, ...) the member is defined on, as reported
    /// by the host runtime's introspection.
    pub defining_type: String,
    pub member_name: String,
    pub source_file: String,
    pub line: i32,
}

impl Frame {
    pub fn new(
        defining_type: impl Into<String>,
        member_name: impl Into<String>,
        source_file: impl Into<String>,
        line: i32,
    ) -> Self {
        Self {
            defining_type: defining_type.into(),
            member_name: member_name.into(),
            source_file: source_file.into(),
            line,
        }
    }
}

impl fmt::Display for Frame {
    /// Renders `defining_type::member_name(source_file:line)`. This is the
    /// label written to the symbol section of encoded profiles; it must stay
    /// stable across releases.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}({}:{})",
            self.defining_type, self.member_name, self.source_file, self.line
        )
    }
}
