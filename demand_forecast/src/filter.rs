//! Filter criteria for category, region and year selections

use crate::data::TransactionRecord;
use crate::error::{ForecastError, Result};
use chrono::Datelike;
use std::fmt;

/// Sentinel meaning "no filter" on the category dimension
pub const ALL_CATEGORIES: &str = "All Categories";
/// Sentinel meaning "no filter" on the region dimension
pub const ALL_REGIONS: &str = "All Regions";
/// Sentinel meaning "no filter" on the year dimension
pub const ALL_YEARS: &str = "All years";

/// Selection on a categorical dimension
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Keep every value
    #[default]
    All,
    /// Keep rows equal to this value
    Only(String),
}

impl Selection {
    fn parse(raw: &str, sentinel: &str) -> Self {
        if raw == sentinel {
            Selection::All
        } else {
            Selection::Only(raw.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

/// Selection on the order year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    /// Keep every year
    #[default]
    All,
    /// Keep a single calendar year
    Year(i32),
    /// Keep an inclusive range; an absent end is open
    Range { start: Option<i32>, end: Option<i32> },
}

impl YearFilter {
    /// Parse `"All years"` or a four digit year
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw == ALL_YEARS {
            return Ok(YearFilter::All);
        }
        raw.parse::<i32>()
            .map(YearFilter::Year)
            .map_err(|_| ForecastError::InvalidParameter(format!("invalid year filter '{}'", raw)))
    }

    /// Build a range filter; both ends absent means no filter
    pub fn range(start: Option<i32>, end: Option<i32>) -> Result<Self> {
        match (start, end) {
            (None, None) => Ok(YearFilter::All),
            (Some(s), Some(e)) if s > e => Err(ForecastError::InvalidParameter(format!(
                "start year {} is after end year {}",
                s, e
            ))),
            _ => Ok(YearFilter::Range { start, end }),
        }
    }

    fn matches(&self, year: i32) -> bool {
        match *self {
            YearFilter::All => true,
            YearFilter::Year(y) => y == year,
            YearFilter::Range { start, end } => {
                start.map_or(true, |s| year >= s) && end.map_or(true, |e| year <= e)
            }
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => write!(f, "{}", ALL_YEARS),
            YearFilter::Year(y) => write!(f, "{}", y),
            YearFilter::Range { start, end } => {
                let fmt_end = |v: &Option<i32>, open: &str| v.map_or(open.to_string(), |y| y.to_string());
                write!(f, "{}-{}", fmt_end(start, "min"), fmt_end(end, "max"))
            }
        }
    }
}

/// Category / region / year selection applied before aggregation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub category: Selection,
    pub region: Selection,
    pub year: YearFilter,
}

impl FilterCriteria {
    /// No filtering on any dimension
    pub fn all() -> Self {
        Self::default()
    }

    /// Build criteria from raw request values, honouring the sentinels
    pub fn from_params(category: &str, region: &str, year: &str) -> Result<Self> {
        Ok(Self {
            category: Selection::parse(category, ALL_CATEGORIES),
            region: Selection::parse(region, ALL_REGIONS),
            year: YearFilter::parse(year)?,
        })
    }

    /// Restrict to one category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Selection::Only(category.into());
        self
    }

    /// Restrict to one region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Selection::Only(region.into());
        self
    }

    /// Restrict the order year
    pub fn with_year(mut self, year: YearFilter) -> Self {
        self.year = year;
        self
    }

    /// Whether a transaction passes every filter
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.category.matches(&record.category)
            && self.region.matches(&record.region)
            && self.year.matches(record.order_date.year())
    }

    /// The error reported when nothing matches these criteria
    pub fn no_data_error(&self) -> ForecastError {
        let label = |s: &Selection, sentinel: &str| match s {
            Selection::All => sentinel.to_string(),
            Selection::Only(v) => v.clone(),
        };
        ForecastError::NoData {
            category: label(&self.category, ALL_CATEGORIES),
            region: label(&self.region, ALL_REGIONS),
            year: self.year.to_string(),
        }
    }
}
