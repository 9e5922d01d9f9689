//! Field registry and per-category layout

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A loggable attribute of a rendered line
///
/// Declaration order is the order fields appear in a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Event time, always emitted
    Timestamp,
    /// `data` property of the payload, always emitted
    Data,
    /// Severity label
    Level,
    /// Base name of the source file of the call site
    File,
    /// Function name of the call site
    Function,
    /// Line number of the call site
    LineNumber,
    /// `id` property of the payload
    Id,
    /// Network address of the host
    ServerIp,
    /// `context` property of the payload
    Context,
    /// Category the event was emitted under
    Category,
}

impl Field {
    /// Number of known fields
    pub const COUNT: usize = 10;

    /// Every field in declaration order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Timestamp,
        Self::Data,
        Self::Level,
        Self::File,
        Self::Function,
        Self::LineNumber,
        Self::Id,
        Self::ServerIp,
        Self::Context,
        Self::Category,
    ];

    /// Canonical key used in rendered lines and options
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Data => "data",
            Self::Level => "level",
            Self::File => "file",
            Self::Function => "function",
            Self::LineNumber => "lineNumber",
            Self::Id => "id",
            Self::ServerIp => "serverIp",
            Self::Context => "context",
            Self::Category => "category",
        }
    }

    /// Compact key used when `shortFieldNames` is set
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Timestamp => "ts",
            Self::Data => "dt",
            Self::Level => "lvl",
            Self::File => "fl",
            Self::Function => "fn",
            Self::LineNumber => "ln",
            Self::Id => "id",
            Self::ServerIp => "sIp",
            Self::Context => "ctx",
            Self::Category => "cat",
        }
    }

    /// Base fields are always emitted unless a layout is edited by hand
    pub const fn is_base(self) -> bool {
        matches!(self, Self::Timestamp | Self::Data)
    }

    /// Whether a fresh layout emits this field
    pub const fn default_enabled(self) -> bool {
        self.is_base()
    }

    /// Key for this field, honouring `short`
    pub const fn key(self, short: bool) -> &'static str {
        if short { self.short_name() } else { self.name() }
    }

    /// Look up a field by its canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Look up an opt-in field by name; base and unknown names yield `None`
    pub fn extra_from_name(name: &str) -> Option<Self> {
        Self::from_name(name).filter(|field| !field.is_base())
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which fields a category emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    enabled: [bool; Field::COUNT],
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            enabled: Field::ALL.map(Field::default_enabled),
        }
    }
}

impl Layout {
    /// Restore every field to its registry default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `field` is emitted
    #[inline]
    pub fn is_enabled(&self, field: Field) -> bool {
        self.enabled[field.index()]
    }

    /// Turn `field` on or off
    pub fn set(&mut self, field: Field, enabled: bool) {
        self.enabled[field.index()] = enabled;
    }

    /// Reset to defaults, then enable every recognised extra field in `names`
    ///
    /// Base field names and unknown names are ignored.
    pub fn select_extras<S: AsRef<str>>(&mut self, names: &[S]) {
        self.reset();
        for field in names
            .iter()
            .filter_map(|name| Field::extra_from_name(name.as_ref()))
        {
            self.set(field, true);
        }
    }

    /// Enabled fields in declaration order
    pub fn enabled_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(move |field| self.is_enabled(*field))
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::COUNT))?;
        for field in Field::ALL {
            map.serialize_entry(field.name(), &self.is_enabled(field))?;
        }
        map.end()
    }
}
