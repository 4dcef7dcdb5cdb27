//! Display formatting for counter values.
//!
//! One locale only: pt-BR grouping, `.` as the thousands separator.

const THOUSANDS_SEPARATOR: char = '.';
const KM_ATTRIBUTE_VALUE: &str = "km";
const KM_SUFFIX: &str = " km";

/// Groups an integer in threes with the pt-BR separator (`1500` → `"1.500"`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        let remaining = digits.len() - index;
        if index > 0 && remaining % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(digit);
    }

    out
}

/// Optional per-element display suffix selected by the `data-format` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatTag {
    #[default]
    Plain,
    Kilometers,
}

impl FormatTag {
    /// Maps an attribute value to a tag. Absent or unrecognized values mean
    /// no suffix.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some(KM_ATTRIBUTE_VALUE) => Self::Kilometers,
            _ => Self::Plain,
        }
    }

    /// Renders a value with grouping and this tag's suffix.
    pub fn render(self, value: u64) -> String {
        let grouped = group_thousands(value);
        match self {
            Self::Plain => grouped,
            Self::Kilometers => {
                let mut out = grouped;
                out.push_str(KM_SUFFIX);
                out
            }
        }
    }
}
