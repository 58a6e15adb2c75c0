use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Vendor-scoped course identifier. Numeric and textual ids never compare equal,
/// even when they render to the same text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum CourseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseId::Number(n) => write!(f, "{n}"),
            CourseId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for CourseId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Course {
    pub name: String,
    pub id: CourseId,
    pub is_par_3: bool,
    pub is_9_hole: bool,
    pub is_par_70_plus: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_info: Option<String>,
}

impl Course {
    /// An 18 hole course below par 70. Use the builder methods to adjust.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<CourseId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            is_par_3: false,
            is_9_hole: false,
            is_par_70_plus: false,
            booking_info: None,
        }
    }

    #[must_use]
    pub fn nine_hole(mut self) -> Self {
        self.is_9_hole = true;
        self
    }

    #[must_use]
    pub fn par_3(mut self) -> Self {
        self.is_par_3 = true;
        self
    }

    #[must_use]
    pub fn par_70_plus(mut self) -> Self {
        self.is_par_70_plus = true;
        self
    }

    #[must_use]
    pub fn booking_info(mut self, info: impl Into<String>) -> Self {
        let info = info.into();
        self.booking_info = if info.is_empty() { None } else { Some(info) };
        self
    }
}

// identity is name + id; the flags are static catalog data
impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.id == other.id
    }
}

impl Eq for Course {}

impl Hash for Course {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.id.hash(state);
    }
}
