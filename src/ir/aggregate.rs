//! Aggregation pipeline, sort and time-field descriptors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Synthetic field name that refers to the metric value.
pub const FIELD_VALUE: &str = "_value";
/// Synthetic field name that refers to the bucket time.
pub const FIELD_TIME: &str = "_time";

/// Function name that only requests time bucketing.
pub const DATE_HISTOGRAM: &str = "date_histogram";
pub const CARDINALITY: &str = "cardinality";

/// One aggregation step.
///
/// `dimensions` is the literal nesting order of the group-by tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregate {
    pub name: String,
    pub field: String,
    pub dimensions: Vec<String>,
    #[serde(with = "window_millis")]
    pub window: Duration,
    pub time_zone: String,
}

impl Aggregate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dimensions<I, S>(mut self, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = dims.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = tz.into();
        self
    }

    pub fn has_window(&self) -> bool {
        !self.window.is_zero()
    }
}

/// Element 0 is applied innermost; later elements wrap it.
pub type Aggregates = Vec<Aggregate>;

/// Windows travel as milliseconds on the wire.
mod window_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Sort key. `ast` is true for ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    #[serde(default = "default_ast")]
    pub ast: bool,
}

fn default_ast() -> bool {
    true
}

impl Order {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ast: true,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ast: false,
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.ast {
            "ASC"
        } else {
            "DESC"
        }
    }
}

/// Ties are broken by later entries.
pub type Orders = Vec<Order>;

/// Storage representation of the time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFieldType {
    /// Date-formatted field, queried with epoch formats.
    Date,
    /// Raw integer timestamp.
    #[default]
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    #[default]
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Multiplier from seconds to this unit.
    pub fn rate(&self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Millisecond => 1_000,
            TimeUnit::Microsecond => 1_000_000,
            TimeUnit::Nanosecond => 1_000_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TimeFieldType,
    pub unit: TimeUnit,
}

impl Default for TimeField {
    fn default() -> Self {
        Self {
            name: "dtEventTimeStamp".to_string(),
            field_type: TimeFieldType::Int,
            unit: TimeUnit::Millisecond,
        }
    }
}

impl TimeField {
    pub fn new(name: impl Into<String>, field_type: TimeFieldType, unit: TimeUnit) -> Self {
        Self {
            name: name.into(),
            field_type,
            unit,
        }
    }
}

/// Short duration notation used by fixed-interval histograms (`1m`, `2h`, `1d`).
pub fn short_duration(d: Duration) -> String {
    let ms = d.as_millis();
    const SECOND: u128 = 1_000;
    const MINUTE: u128 = 60 * SECOND;
    const HOUR: u128 = 60 * MINUTE;
    const DAY: u128 = 24 * HOUR;

    if ms == 0 {
        "0s".to_string()
    } else if ms % DAY == 0 {
        format!("{}d", ms / DAY)
    } else if ms % HOUR == 0 {
        format!("{}h", ms / HOUR)
    } else if ms % MINUTE == 0 {
        format!("{}m", ms / MINUTE)
    } else if ms % SECOND == 0 {
        format!("{}s", ms / SECOND)
    } else {
        format!("{}ms", ms)
    }
}
