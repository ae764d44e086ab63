//! Page arithmetic for post listings.
//!
//! Two resolution modes exist. Listing pages ([`Paginator::page`]) are strict:
//! a malformed or out-of-range `?page=` is a 404. Profile pages
//! ([`Paginator::get_page`]) are lenient and always land on some page.

use serde::Serialize;
use thiserror::Error;

/// Posts per page on every listing.
pub const PAGE_SIZE: u64 = 10;

/// Query value that selects the final page in strict mode.
const LAST_PAGE: &str = "last";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPage {
    #[error("page number {0:?} is not an integer")]
    NotAnInteger(String),

    #[error("page {0} contains no results")]
    Empty(i64),
}

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of pages; an empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `?page=` value strictly. Absent or blank means page 1.
    pub fn page(&self, raw: Option<&str>) -> Result<u64, InvalidPage> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(1);
        };
        if raw == LAST_PAGE {
            return Ok(self.num_pages());
        }
        let number: i64 = raw
            .parse()
            .map_err(|_| InvalidPage::NotAnInteger(raw.to_string()))?;
        self.validate(number)
    }

    /// Resolve a raw `?page=` value leniently: garbage means the first page,
    /// anything out of range means the last one.
    pub fn get_page(&self, raw: Option<&str>) -> u64 {
        let Some(number) = raw.and_then(|r| r.trim().parse::<i64>().ok()) else {
            return 1;
        };
        self.validate(number).unwrap_or_else(|_| self.num_pages())
    }

    /// Offset of the first item of `number`.
    pub fn offset(&self, number: u64) -> u64 {
        number.saturating_sub(1) * self.per_page
    }

    fn validate(&self, number: i64) -> Result<u64, InvalidPage> {
        if number < 1 {
            return Err(InvalidPage::Empty(number));
        }
        let number = number as u64;
        if number > self.num_pages() {
            return Err(InvalidPage::Empty(number as i64));
        }
        Ok(number)
    }
}

/// One page of results together with its navigation facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, paginator: &Paginator) -> Self {
        let num_pages = paginator.num_pages();
        Self {
            items,
            number,
            num_pages,
            count: paginator.count(),
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous.then(|| self.number - 1)
    }
}
