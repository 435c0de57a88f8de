use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::CatalogError;

pub const DEFAULT_CATEGORY: &str = "all";

/// Query generation. Bumped on every filter change except paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    All,
    Web,
    Social,
    Local,
}

impl Source {
    /// Value sent as `source`; `All` means no source filter.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Source::All => None,
            Source::Web => Some("Web"),
            Source::Social => Some("Social"),
            Source::Local => Some("Local"),
        }
    }
}

impl FromStr for Source {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Source::All),
            "web" => Ok(Source::Web),
            "social" => Ok(Source::Social),
            "local" => Ok(Source::Local),
            other => Err(CatalogError::Validation(format!("unknown source '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    AToZ,
    Popular,
    Downloads,
}

impl SortOption {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::AToZ => "a-z",
            SortOption::Popular => "popular",
            SortOption::Downloads => "downloads",
        }
    }

    /// Only `oldest` is ascending; every other sort is served newest/highest first.
    pub fn order(self) -> SortOrder {
        match self {
            SortOption::Oldest => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl FromStr for SortOption {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOption::Newest),
            "oldest" => Ok(SortOption::Oldest),
            "a-z" | "az" => Ok(SortOption::AToZ),
            "popular" => Ok(SortOption::Popular),
            "downloads" => Ok(SortOption::Downloads),
            other => Err(CatalogError::Validation(format!("unknown sort '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Canonical query state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub search: String,
    pub category: String,
    pub source: Source,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: SortOption,
    /// Client-side hint only; not part of the remote query.
    pub orientation: Option<String>,
    /// Client-side hint only; not part of the remote query.
    pub color: Option<String>,
    pub page: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            source: Source::All,
            date_from: None,
            date_to: None,
            sort: SortOption::Newest,
            orientation: None,
            color: None,
            page: 1,
        }
    }
}

/// Partial filter update. `None` leaves a field untouched; the nested options
/// on nullable fields allow clearing them with `Some(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub category: Option<String>,
    pub source: Option<Source>,
    pub date_from: Option<Option<NaiveDate>>,
    pub date_to: Option<Option<NaiveDate>>,
    pub sort: Option<SortOption>,
    pub orientation: Option<Option<String>>,
    pub color: Option<Option<String>>,
}

impl FilterPatch {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn date_from(mut self, date: Option<NaiveDate>) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: Option<NaiveDate>) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn orientation(mut self, orientation: Option<String>) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &FilterPatch::default()
    }

    fn apply_to(self, filter: &mut Filter) {
        if let Some(search) = self.search {
            filter.search = search.trim().to_string();
        }
        if let Some(category) = self.category {
            let category = category.trim();
            filter.category = if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_string()
            };
        }
        if let Some(source) = self.source {
            filter.source = source;
        }
        if let Some(date_from) = self.date_from {
            filter.date_from = date_from;
        }
        if let Some(date_to) = self.date_to {
            filter.date_to = date_to;
        }
        if let Some(sort) = self.sort {
            filter.sort = sort;
        }
        if let Some(orientation) = self.orientation {
            filter.orientation = orientation;
        }
        if let Some(color) = self.color {
            filter.color = color;
        }
    }
}

/// Request parameters for one `listImages` call, already in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub source: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
}

impl ListParams {
    /// Newest-first listing of one category, as used after a scrape completes.
    pub fn recent_in_category(category: Option<String>, limit: u32) -> Self {
        Self {
            search: None,
            source: None,
            date_from: None,
            date_to: None,
            sort_by: SortOption::Newest.as_param().to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit,
            category,
        }
    }

    /// Query pairs in a stable order; absent filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(9);
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        if let Some(date_from) = &self.date_from {
            pairs.push(("date_from", date_from.clone()));
        }
        if let Some(date_to) = &self.date_to {
            pairs.push(("date_to", date_to.clone()));
        }
        pairs.push(("sort_by", self.sort_by.clone()));
        pairs.push(("sort_order", self.sort_order.as_param().to_string()));
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
    }
}

fn iso_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Owns the current [`Filter`] and its [`Epoch`].
///
/// Only the dispatcher mutates the store, so epoch increments are serialized
/// with respect to fetch completions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterStore {
    filter: Filter,
    epoch: Epoch,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Merges `patch`, forces page 1 and starts a new epoch.
    pub fn update_filters(&mut self, patch: FilterPatch) -> Epoch {
        patch.apply_to(&mut self.filter);
        self.filter.page = 1;
        self.bump()
    }

    /// Restores defaults and starts a new epoch.
    pub fn reset_filters(&mut self) -> Epoch {
        self.filter = Filter::default();
        self.bump()
    }

    /// Same filters, new epoch: re-reads the result set from page 1.
    pub fn refresh(&mut self) -> Epoch {
        self.filter.page = 1;
        self.bump()
    }

    /// Continuation of the current result set; the epoch is unchanged.
    pub fn advance_page(&mut self) -> u32 {
        self.filter.page = self.filter.page.saturating_add(1);
        self.filter.page
    }

    pub fn params(&self, limit: u32) -> ListParams {
        let filter = &self.filter;
        let search = Some(filter.search.trim())
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned);
        let category = Some(filter.category.trim())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(DEFAULT_CATEGORY))
            .map(ToOwned::to_owned);
        ListParams {
            search,
            source: filter.source.as_param().map(ToOwned::to_owned),
            date_from: filter.date_from.map(iso_midnight),
            date_to: filter.date_to.map(iso_midnight),
            sort_by: filter.sort.as_param().to_string(),
            sort_order: filter.sort.order(),
            page: filter.page,
            limit,
            category,
        }
    }

    fn bump(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_omit_every_optional_filter() {
        let store = FilterStore::new();
        let params = store.params(20);
        assert_eq!(
            params.query_pairs(),
            vec![
                ("sort_by", "newest".to_string()),
                ("sort_order", "desc".to_string()),
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn oldest_sorts_ascending_and_dates_are_utc_midnight() {
        let mut store = FilterStore::new();
        store.update_filters(
            FilterPatch::default()
                .sort(SortOption::Oldest)
                .source(Source::Web)
                .date_from(NaiveDate::from_ymd_opt(2024, 3, 1))
                .category("Nature"),
        );
        let params = store.params(20);
        assert_eq!(params.sort_order, SortOrder::Asc);
        assert_eq!(params.source.as_deref(), Some("Web"));
        assert_eq!(params.date_from.as_deref(), Some("2024-03-01T00:00:00.000Z"));
        assert_eq!(params.date_to, None);
        assert_eq!(params.category.as_deref(), Some("Nature"));
    }

    #[test]
    fn blank_search_and_all_category_are_not_sent() {
        let mut store = FilterStore::new();
        store.update_filters(FilterPatch::default().search("   ").category("ALL"));
        let params = store.params(20);
        assert_eq!(params.search, None);
        assert_eq!(params.category, None);
    }

    #[test]
    fn advance_page_keeps_epoch() {
        let mut store = FilterStore::new();
        let epoch = store.epoch();
        assert_eq!(store.advance_page(), 2);
        assert_eq!(store.advance_page(), 3);
        assert_eq!(store.epoch(), epoch);
        assert_eq!(store.params(20).page, 3);
    }

    #[test]
    fn any_update_resets_page_and_bumps_epoch() {
        let mut store = FilterStore::new();
        store.advance_page();
        let before = store.epoch();
        let after = store.update_filters(FilterPatch::default().color(Some("red".into())));
        assert!(after > before);
        assert_eq!(store.filter().page, 1);
        assert_eq!(store.filter().color.as_deref(), Some("red"));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = FilterStore::new();
        store.update_filters(FilterPatch::default().search("cats").source(Source::Local));
        let epoch = store.epoch();
        assert_eq!(store.reset_filters(), Epoch(epoch.value() + 1));
        assert_eq!(store.filter(), &Filter::default());
    }

    #[test]
    fn sort_and_source_parse_from_cli_names() {
        assert_eq!("a-z".parse::<SortOption>(), Ok(SortOption::AToZ));
        assert_eq!("Social".parse::<Source>(), Ok(Source::Social));
        assert!("sideways".parse::<SortOption>().is_err());
    }
}
