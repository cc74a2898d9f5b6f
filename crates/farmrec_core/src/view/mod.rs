//! Read-side projections for index pages.

pub mod listing;

pub use listing::{
    build_list_view, filter_records, page_count, paginate, InvalidPageSize, ListCriteria,
    ListView, Listable, PageSize, ALL_SENTINEL,
};
