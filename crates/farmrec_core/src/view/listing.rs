//! Search, filter and pagination for index pages.
//!
//! # Responsibility
//! - Narrow a record collection by free-text search and categorical filters.
//! - Slice the narrowed collection into pages of a supported size.
//!
//! # Invariants
//! - Filtering preserves input order and never adds records.
//! - Concatenating pages `1..=page_count` reproduces the filtered collection.
//! - Nothing here touches storage; equal inputs give equal outputs.

use crate::model::crab::CrabRecord;
use crate::model::enums::FieldEnum;
use crate::model::pond::Pond;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Filter value that disables a filter.
pub const ALL_SENTINEL: &str = "All";

/// Record type that can be searched and filtered on an index page.
pub trait Listable {
    /// Values matched by the free-text search.
    fn search_values(&self) -> Vec<Cow<'_, str>>;

    /// Value of categorical `field`, or `None` when the record does not
    /// expose it.
    fn category_value(&self, field: &str) -> Option<Cow<'_, str>>;
}

/// Supported page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        Self::Five,
        Self::Ten,
        Self::Twenty,
        Self::Fifty,
        Self::Hundred,
    ];

    pub fn get(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }
}

/// Requested page size outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPageSize(pub u32);

impl Display for InvalidPageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported page size {}; expected one of 5, 10, 20, 50, 100",
            self.0
        )
    }
}

impl Error for InvalidPageSize {}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value as usize)
            .ok_or(InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get() as u32
    }
}

/// Index page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListCriteria {
    pub search: String,
    /// Field name -> required value, or [`ALL_SENTINEL`].
    pub filters: BTreeMap<String, String>,
    /// 1-based.
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for ListCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

/// One rendered index page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub filtered_count: usize,
    pub page_count: usize,
    /// Page actually shown after clamping.
    pub page: usize,
    pub page_size: PageSize,
}

/// Returns the records matching `search` and every active filter, in input
/// order.
pub fn filter_records<T: Listable + Clone>(
    records: &[T],
    search: &str,
    filters: &BTreeMap<String, String>,
) -> Vec<T> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|record| matches_search(*record, &needle) && matches_filters(*record, filters))
        .cloned()
        .collect()
}

/// Slices page `page` (1-based) out of `items`. Out-of-range pages are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: PageSize) -> Vec<T> {
    if page == 0 {
        return Vec::new();
    }
    let size = page_size.get();
    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(size).min(items.len());
    items[start..end].to_vec()
}

/// Number of pages needed for `filtered_count` records.
pub fn page_count(filtered_count: usize, page_size: PageSize) -> usize {
    filtered_count.div_ceil(page_size.get())
}

/// Filters and paginates `records`, clamping the page into range.
///
/// An empty result reports page 1 of 0.
pub fn build_list_view<T: Listable + Clone>(records: &[T], criteria: &ListCriteria) -> ListView<T> {
    let filtered = filter_records(records, &criteria.search, &criteria.filters);
    let pages = page_count(filtered.len(), criteria.page_size);
    let page = criteria.page.clamp(1, pages.max(1));
    ListView {
        items: paginate(&filtered, page, criteria.page_size),
        filtered_count: filtered.len(),
        page_count: pages,
        page,
        page_size: criteria.page_size,
    }
}

fn matches_search<T: Listable>(record: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .search_values()
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
}

fn matches_filters<T: Listable>(record: &T, filters: &BTreeMap<String, String>) -> bool {
    filters
        .iter()
        .filter(|(_, wanted)| wanted.as_str() != ALL_SENTINEL)
        .all(|(field, wanted)| {
            record
                .category_value(field)
                .is_some_and(|value| value == wanted.as_str())
        })
}

impl Listable for CrabRecord {
    fn search_values(&self) -> Vec<Cow<'_, str>> {
        let mut values = vec![
            Cow::Borrowed(self.crab.species.as_str()),
            Cow::Borrowed(self.crab.tag_id.as_str()),
        ];
        if let Some(pond) = &self.pond_tag_id {
            values.push(Cow::Borrowed(pond.as_str()));
        }
        values
    }

    fn category_value(&self, field: &str) -> Option<Cow<'_, str>> {
        let value = match field {
            "species" => self.crab.species.as_str(),
            "gender" => self.crab.gender.as_str(),
            "health_status" => self.crab.health_status.as_str(),
            "pond" => self.pond_tag_id.as_deref()?,
            _ => return None,
        };
        Some(Cow::Borrowed(value))
    }
}

impl Listable for Pond {
    fn search_values(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.location.as_str()),
            Cow::Borrowed(self.water_type.as_str()),
            Cow::Owned(self.size.to_string()),
            Cow::Owned(self.setup_date.format("%Y-%m-%d").to_string()),
        ]
    }

    fn category_value(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "location" => Some(Cow::Borrowed(self.location.as_str())),
            "water_type" => Some(Cow::Borrowed(self.water_type.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_list_view, filter_records, page_count, paginate, ListCriteria, Listable, PageSize,
        ALL_SENTINEL,
    };
    use std::borrow::Cow;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        color: &'static str,
    }

    impl Listable for Row {
        fn search_values(&self) -> Vec<Cow<'_, str>> {
            vec![Cow::Borrowed(self.name.as_str())]
        }

        fn category_value(&self, field: &str) -> Option<Cow<'_, str>> {
            (field == "color").then_some(Cow::Borrowed(self.color))
        }
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| Row {
                name: format!("Row-{i:03}"),
                color: if i % 3 == 0 { "red" } else { "blue" },
            })
            .collect()
    }

    fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_search_and_all_filters_return_everything() {
        let records = rows(12);
        let out = filter_records(&records, "", &filters(&[("color", ALL_SENTINEL)]));
        assert_eq!(out, records);
    }

    #[test]
    fn filtered_set_is_ordered_subset_satisfying_predicates() {
        let records = rows(30);
        let out = filter_records(&records, "row-0", &filters(&[("color", "red")]));
        assert!(!out.is_empty());
        assert!(out.iter().all(|row| row.color == "red"));
        let positions: Vec<usize> = out
            .iter()
            .map(|row| records.iter().position(|r| r == row).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = rows(5);
        assert_eq!(filter_records(&records, "ROW-004", &BTreeMap::new()).len(), 1);
    }

    #[test]
    fn search_term_is_matched_verbatim() {
        let records = vec![
            Row {
                name: "Mud Crab".to_string(),
                color: "red",
            },
            Row {
                name: "CRB-2025-04-08-0001".to_string(),
                color: "blue",
            },
        ];
        assert_eq!(filter_records(&records, "crab", &BTreeMap::new()).len(), 1);
        assert!(filter_records(&records, "crab ", &BTreeMap::new()).is_empty());
        assert!(filter_records(&records, "   ", &BTreeMap::new()).is_empty());
    }

    #[test]
    fn unknown_filter_field_matches_nothing() {
        let records = rows(5);
        assert!(filter_records(&records, "", &filters(&[("size", "big")])).is_empty());
    }

    #[test]
    fn pages_concatenate_to_filtered_set_for_every_size() {
        for count in [0, 1, 4, 5, 6, 23, 100, 101] {
            let records = rows(count);
            for size in PageSize::ALL {
                let pages = page_count(records.len(), size);
                let mut joined = Vec::new();
                for page in 1..=pages {
                    let slice = paginate(&records, page, size);
                    assert!(slice.len() <= size.get());
                    joined.extend(slice);
                }
                assert_eq!(joined, records, "count={count} size={size:?}");
                assert!(paginate(&records, pages + 1, size).is_empty());
            }
        }
    }

    #[test]
    fn list_view_clamps_overflowing_page() {
        let records = rows(23);
        let criteria = ListCriteria {
            page: 9,
            ..ListCriteria::default()
        };
        let view = build_list_view(&records, &criteria);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.page, 3);
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.filtered_count, 23);
    }

    #[test]
    fn list_view_of_nothing_is_page_one() {
        let view = build_list_view(&rows(0), &ListCriteria::default());
        assert_eq!(view.page, 1);
        assert_eq!(view.page_count, 0);
        assert!(view.items.is_empty());
    }

    #[test]
    fn page_size_accepts_only_supported_values() {
        assert_eq!(PageSize::try_from(20).unwrap(), PageSize::Twenty);
        assert!(PageSize::try_from(15).is_err());
        assert_eq!(PageSize::default().get(), 10);
    }
}
