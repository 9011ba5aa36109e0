use serde::{Deserialize, Serialize};

use crate::pagination::{Pagination, DEFAULT_PER_PAGE};
use crate::query::{encode_active_flag, parse_active_flag, ListParams, SortDirection};

/// Local mirror of the list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search: String,
    pub sort: Option<String>,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
    pub is_active: Option<bool>,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            search: String::new(),
            sort: None,
            direction: SortDirection::Asc,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            is_active: None,
        }
    }
}

impl QueryState {
    /// Seeds state from the filters the server echoed back.
    pub fn from_filters(filters: &ListParams) -> Self {
        let defaults = QueryState::default();
        QueryState {
            search: filters.search.clone().unwrap_or_default(),
            sort: filters.sort.clone(),
            direction: filters
                .direction
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.direction),
            page: filters.page.unwrap_or(defaults.page).max(1),
            per_page: filters.per_page.unwrap_or(defaults.per_page),
            is_active: parse_active_flag(filters.is_active.as_deref()),
        }
    }

    /// Full query for a round-trip. Page, per-page and direction are always
    /// sent; search, sort and activity only when set.
    pub fn to_params(&self) -> ListParams {
        ListParams {
            search: Some(self.search.clone()).filter(|s| !s.is_empty()),
            is_active: self.is_active.map(|a| encode_active_flag(a).to_string()),
            sort: self.sort.clone(),
            direction: Some(self.direction.as_str().to_string()),
            page: Some(self.page),
            per_page: Some(self.per_page),
        }
    }

    /// Querystring for a shareable URL.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self.to_params()).unwrap_or_default()
    }

    /// Same column flips direction; a new column starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort.as_deref() == Some(column) {
            self.direction = self.direction.reversed();
        } else {
            self.sort = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
        self.page = 1;
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page;
        self.page = 1;
    }

    pub fn set_is_active(&mut self, is_active: Option<bool>) {
        self.is_active = is_active;
        self.page = 1;
    }

    /// Adopts the server's view of the page window. A page requested past
    /// the end comes back clamped to `last_page`, so the next navigation
    /// starts from the last real page.
    pub fn sync_pagination(&mut self, pagination: &Pagination) {
        self.page = pagination.current_page;
        self.per_page = pagination.per_page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_same_column_flips_direction() {
        let mut state = QueryState {
            page: 4,
            ..QueryState::default()
        };
        state.toggle_sort("name");
        assert_eq!((state.sort.as_deref(), state.direction), (Some("name"), SortDirection::Asc));
        assert_eq!(state.page, 1);

        state.toggle_sort("name");
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle_sort("name");
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle_sort("name");
        state.toggle_sort("is_active");
        assert_eq!((state.sort.as_deref(), state.direction), (Some("is_active"), SortDirection::Asc));
    }

    #[test]
    fn params_carry_every_navigation_field() {
        let state = QueryState {
            search: "shoe".into(),
            sort: Some("name".into()),
            direction: SortDirection::Desc,
            page: 2,
            per_page: 20,
            is_active: Some(false),
        };
        let params = state.to_params();
        assert_eq!(params.search.as_deref(), Some("shoe"));
        assert_eq!(params.is_active.as_deref(), Some("0"));
        assert_eq!(params.direction.as_deref(), Some("desc"));
        assert_eq!((params.page, params.per_page), (Some(2), Some(20)));
        assert_eq!(QueryState::from_filters(&params), state);
    }

    #[test]
    fn query_string_omits_unset_filters() {
        let query = QueryState::default().to_query_string();
        assert_eq!(query, "direction=asc&page=1&per_page=10");
    }

    #[test]
    fn per_page_and_activity_reset_page() {
        let mut state = QueryState {
            page: 3,
            ..QueryState::default()
        };
        state.set_per_page(50);
        assert_eq!((state.page, state.per_page), (1, 50));

        state.page = 2;
        state.set_is_active(Some(true));
        assert_eq!(state.page, 1);
        assert_eq!(state.to_params().is_active.as_deref(), Some("1"));
    }
}
