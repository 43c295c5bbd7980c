//! Issue categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed classification tag for the kind of issue reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Power cuts and electrical faults.
    PowerCut,
    /// Drainage and sewage problems.
    Drainage,
    /// Potholes and damaged roads.
    RoadDamage,
    /// Water supply interruptions or leaks.
    WaterSupply,
    /// Uncollected garbage and waste management.
    Garbage,
    /// Broken or unlit street lights.
    StreetLight,
    /// Damage to public property.
    PublicProperty,
    /// Noise pollution.
    NoisePollution,
    /// Anything not covered above.
    Other,
}

impl Category {
    /// Every category in catalogue order.
    pub const ALL: [Self; 9] = [
        Self::PowerCut,
        Self::Drainage,
        Self::RoadDamage,
        Self::WaterSupply,
        Self::Garbage,
        Self::StreetLight,
        Self::PublicProperty,
        Self::NoisePollution,
        Self::Other,
    ];

    /// Stable identifier stored on complaint documents.
    pub const fn id(self) -> &'static str {
        match self {
            Self::PowerCut => "power_cut",
            Self::Drainage => "drainage",
            Self::RoadDamage => "road_damage",
            Self::WaterSupply => "water_supply",
            Self::Garbage => "garbage",
            Self::StreetLight => "street_light",
            Self::PublicProperty => "public_property",
            Self::NoisePollution => "noise_pollution",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerCut => "Power Cut / Electrical Issues",
            Self::Drainage => "Drainage / Sewage Problems",
            Self::RoadDamage => "Road Damage / Potholes",
            Self::WaterSupply => "Water Supply Issues",
            Self::Garbage => "Garbage / Waste Management",
            Self::StreetLight => "Street Light Issues",
            Self::PublicProperty => "Public Property Damage",
            Self::NoisePollution => "Noise Pollution",
            Self::Other => "Other",
        }
    }

    /// Lenient lookup used for display: unknown ids resolve to
    /// [`Category::Other`].
    ///
    /// # Examples
    /// ```
    /// use cleantrack::domain::Category;
    ///
    /// assert_eq!(Category::lookup("garbage"), Category::Garbage);
    /// assert_eq!(Category::lookup("volcano"), Category::Other);
    /// ```
    pub fn lookup(id: &str) -> Self {
        id.parse().unwrap_or(Self::Other)
    }
}

/// Error returned when parsing a [`Category`] from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown complaint category: {}", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.id() == value)
            .ok_or_else(|| ParseCategoryError(value.to_owned()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
