//! Category list query parameters and their validated form.
//!
//! `ListParams` is the raw querystring as it travels over the wire in both
//! directions. `CategoryQuery` is what the repositories execute: search term,
//! activity filter, a whitelisted sort column, and the page window.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{AppResult, FieldErrors};
use crate::pagination::{Pagination, DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Querystring of `GET /categories`. Echoed back as `filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// `"1"` means active, any other non-empty value means inactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub per_page: Option<u32>,
}

/// Reads a page number from either a querystring (`"3"`) or JSON (`3`).
/// Empty or non-numeric input counts as absent so defaults apply.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientNumber;

    impl<'de> Visitor<'de> for LenientNumber {
        type Value = Option<u32>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer, a numeric string, or nothing")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.trim().parse().ok())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(u32::try_from(value).ok())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(u32::try_from(value).ok())
        }

        fn visit_f64<E: de::Error>(self, _value: f64) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(LenientNumber)
}

impl ListParams {
    /// Empty strings count as absent.
    pub fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        ListParams {
            search: present(self.search),
            is_active: present(self.is_active),
            sort: present(self.sort),
            direction: present(self.direction),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Decodes the `is_active` wire value.
pub fn parse_active_flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(value == "1"),
    }
}

pub fn encode_active_flag(active: bool) -> &'static str {
    if active {
        "1"
    } else {
        "0"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    Slug,
    ParentName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::Name,
        SortColumn::Slug,
        SortColumn::ParentName,
        SortColumn::IsActive,
        SortColumn::CreatedAt,
        SortColumn::UpdatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Slug => "slug",
            SortColumn::ParentName => "parent_name",
            SortColumn::IsActive => "is_active",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| format!("The selected sort column '{}' is invalid.", s))
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("The sort direction must be 'asc' or 'desc', got '{}'.", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub sort: Option<(SortColumn, SortDirection)>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for CategoryQuery {
    fn default() -> Self {
        CategoryQuery {
            search: None,
            is_active: None,
            sort: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl CategoryQuery {
    pub fn from_params(params: &ListParams) -> AppResult<Self> {
        let mut errors = FieldErrors::new();

        let direction = match params.direction.as_deref() {
            Some(raw) => raw.parse::<SortDirection>().unwrap_or_else(|message| {
                errors.add("direction", message);
                SortDirection::Asc
            }),
            None => SortDirection::Asc,
        };

        let sort = match params.sort.as_deref() {
            Some(raw) => match raw.parse::<SortColumn>() {
                Ok(column) => Some((column, direction)),
                Err(message) => {
                    errors.add("sort", message);
                    None
                }
            },
            None => None,
        };

        let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            errors.add(
                "per_page",
                format!("The per page value must be between 1 and {}.", MAX_PER_PAGE),
            );
        }

        errors.into_result()?;

        Ok(CategoryQuery {
            search: params.search.clone().filter(|s| !s.is_empty()),
            is_active: parse_active_flag(params.is_active.as_deref()),
            sort,
            page: params.page.unwrap_or(1).max(1),
            per_page,
        })
    }

    /// Effective ordering; newest first when no sort was requested.
    pub fn order(&self) -> (SortColumn, SortDirection) {
        self.sort
            .unwrap_or((SortColumn::CreatedAt, SortDirection::Desc))
    }

    pub fn offset(&self) -> u64 {
        Pagination::offset(self.page, self.per_page)
    }

    /// `ILIKE` pattern for the search term with wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Row predicate equivalent to the SQL filters.
    pub fn matches(&self, name: &str, is_active: bool) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map_or(true, |term| name.to_lowercase().contains(&term.to_lowercase()));
        let active_ok = self.is_active.map_or(true, |wanted| wanted == is_active);
        search_ok && active_ok
    }
}
