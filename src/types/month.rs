//! Calendar month keys and their `"MonthName-Year"` labels.

use chrono::Month as ChronoMonth;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);
impl Year {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Years are written as strings (`"2009"`) in the source document, but plain
/// numbers are accepted too.
impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawYear {
            Number(i32),
            Text(String),
        }

        match RawYear::deserialize(deserializer)? {
            RawYear::Number(year) => Ok(Year(year)),
            RawYear::Text(text) => text
                .trim()
                .parse()
                .map(Year)
                .map_err(|_| serde::de::Error::custom(format!("invalid year '{text}'"))),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// A single calendar month of a year, ordered chronologically.
///
/// Displays as the date label used as join key in every output table,
/// e.g. `Month::new(3, 2015)` renders as `"March-2015"`.
///
/// ```
/// use bike_weather_etl::Month;
///
/// let month = Month::new(3, 2015).unwrap();
/// assert_eq!(month.to_string(), "March-2015");
/// assert!(Month::new(13, 2015).is_none());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month(i32, u32);
impl Month {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(year, month))
    }
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }

    /// All twelve months of `year`, January first.
    pub fn all_of(year: Year) -> impl Iterator<Item = Month> {
        (1..=12).map(move |m| Self(year.get(), m))
    }

    /// English month name, e.g. `"January"`.
    pub fn name(self) -> &'static str {
        // `new` guarantees 1..=12, which always converts.
        ChronoMonth::try_from(self.1 as u8)
            .map(|m| m.name())
            .unwrap_or_default()
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name(), self.0)
    }
}

/// Parses a `"MonthName-Year"` label back into a [`Month`].
impl FromStr for Month {
    type Err = ();

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let (name, year) = label.rsplit_once('-').ok_or(())?;
        let month = name.parse::<ChronoMonth>().map_err(|_| ())?;
        let year = year.parse::<i32>().map_err(|_| ())?;
        Month::new(month.number_from_month(), year).ok_or(())
    }
}
