//! Site identifiers: the nest and the five flowers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TraplineError;

/// Number of sites in the landscape (nest + five flowers).
pub const SITE_COUNT: usize = 6;

/// A location the forager can occupy. `0` is the nest, `1..=5` are flowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Site(u8);

/// An ordered list of visited sites, starting at the nest.
pub type Route = Vec<Site>;

impl Site {
    /// The nest.
    pub const NEST: Self = Self(0);

    /// Create a site from its index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSite` if `index >= SITE_COUNT`.
    pub fn new(index: usize) -> Result<Self, TraplineError> {
        if index < SITE_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(TraplineError::InvalidSite(index))
        }
    }

    /// Matrix index of this site.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this is the nest.
    #[must_use]
    pub const fn is_nest(self) -> bool {
        self.0 == 0
    }

    /// All sites in id order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SITE_COUNT as u8).map(Self)
    }

    /// The five flowers in id order.
    pub fn flowers() -> impl Iterator<Item = Self> {
        (1..SITE_COUNT as u8).map(Self)
    }
}

impl TryFrom<u8> for Site {
    type Error = TraplineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(usize::from(value))
    }
}

impl From<Site> for u8 {
    fn from(site: Site) -> Self {
        site.0
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build a route from raw site ids.
///
/// # Errors
///
/// Returns `InvalidSite` for the first id outside `0..6`.
pub fn route_from_ids(ids: &[usize]) -> Result<Route, TraplineError> {
    ids.iter().map(|&id| Site::new(id)).collect()
}

/// Render a route as `0-1-2-3-4-5-0`.
#[must_use]
pub fn format_route(route: &[Site]) -> String {
    route
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}
