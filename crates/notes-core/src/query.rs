//! Filter state and the list query it maps to.
//!
//! `build_query` is the single source of truth for query semantics. The
//! output is a form-urlencoded string with parameters in a fixed order:
//! `q`, `category`, `_sort`, `_order`.

use crate::note::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category selection for the list, `All` meaning no category constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => c.fmt(f),
        }
    }
}

/// Sort order by note date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sorter {
    #[default]
    Newest,
    Oldest,
}

impl Sorter {
    /// Value of the `_order` parameter.
    pub fn order(&self) -> &'static str {
        match self {
            Sorter::Newest => "desc",
            Sorter::Oldest => "asc",
        }
    }
}

/// Search text, category and sort order applied to the note list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub category: CategoryFilter,
    pub sorter: Sorter,
}

impl FilterState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_sorter(mut self, sorter: Sorter) -> Self {
        self.sorter = sorter;
        self
    }
}

/// Build the list query string for a filter.
pub fn build_query(filter: &FilterState) -> String {
    let mut params = url::form_urlencoded::Serializer::new(String::new());

    if !filter.search.is_empty() {
        params.append_pair("q", &filter.search);
    }

    if let CategoryFilter::Only(category) = filter.category {
        params.append_pair("category", category.as_str());
    }

    params.append_pair("_sort", "date");
    params.append_pair("_order", filter.sorter.order());

    params.finish()
}
