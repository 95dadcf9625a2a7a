//! Visibility filters selected by the route.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The visible partition of the list.
///
/// Unknown or empty route tokens always resolve to [`Filter::All`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every item is visible.
    #[default]
    All,
    /// Only items that are not completed.
    Active,
    /// Only completed items.
    Completed,
}

impl Filter {
    /// All filters, in the order they appear in the footer.
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Resolve a route token.
    ///
    /// ```
    /// use todo_sync_core::filter::Filter;
    ///
    /// assert_eq!(Filter::from_route(""), Filter::All);
    /// assert_eq!(Filter::from_route("active"), Filter::Active);
    /// assert_eq!(Filter::from_route("bogus"), Filter::All);
    /// ```
    #[must_use]
    pub fn from_route(token: &str) -> Self {
        match token {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    /// The route token for this filter (`""` for [`Filter::All`]).
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Link target used by the filter links (`#/`, `#/active`, `#/completed`).
    #[must_use]
    pub fn href(self) -> String {
        format!("#/{}", self.token())
    }

    /// Whether an item with the given completion state is visible.
    #[must_use]
    pub const fn admits(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Active => f.write_str("active"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Extract the trailing route token from a location fragment.
///
/// `"#/active"`, `"/active"` and `"active"` all yield `"active"`.
#[must_use]
pub fn route_token(fragment: &str) -> &str {
    fragment.trim_start_matches('#').trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_with_fallback() {
        let resolved: Vec<Filter> = ["", "active", "completed", "bogus"]
            .into_iter()
            .map(Filter::from_route)
            .collect();
        assert_eq!(
            resolved,
            vec![Filter::All, Filter::Active, Filter::Completed, Filter::All]
        );
    }

    #[test]
    fn token_round_trips_through_href() {
        for filter in Filter::ALL {
            assert_eq!(Filter::from_route(route_token(&filter.href())), filter);
        }
    }

    #[test]
    fn admits_partitions_by_completion() {
        assert!(Filter::All.admits(true) && Filter::All.admits(false));
        assert!(Filter::Active.admits(false) && !Filter::Active.admits(true));
        assert!(Filter::Completed.admits(true) && !Filter::Completed.admits(false));
    }

    #[test]
    fn route_token_strips_fragment_prefix() {
        assert_eq!(route_token("#/completed"), "completed");
        assert_eq!(route_token("#/"), "");
        assert_eq!(route_token(""), "");
    }
}
