//! Category grouping and filter view model
//!
//! Read-only projections of the timer collection for presentation. Filter
//! selection and expand/collapse state live here and are never persisted.

use std::{collections::HashSet, fmt};

use super::{collection::TimerCollection, timer::Timer};

/// Which categories are displayed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// `All` (any case) selects everything, anything else a single category
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => f.write_str(category),
        }
    }
}

/// Timers of one category, in collection order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub expanded: bool,
    pub timers: Vec<&'a Timer>,
}

impl CategoryGroup<'_> {
    pub fn running(&self) -> usize {
        self.timers.iter().filter(|t| t.is_running()).count()
    }

    pub fn completed(&self) -> usize {
        self.timers.iter().filter(|t| t.is_completed()).count()
    }
}

/// Presentation state for the grouped timer list
#[derive(Debug, Clone, Default)]
pub struct CategoryView {
    filter: CategoryFilter,
    expanded: HashSet<String>,
}

impl CategoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn select(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Flip a category between expanded and collapsed; returns the new state
    pub fn toggle(&mut self, category: &str) -> bool {
        if self.expanded.remove(category) {
            false
        } else {
            self.expanded.insert(category.to_string());
            true
        }
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded.contains(category)
    }

    /// Groups passing the current filter, in order of first appearance
    pub fn groups<'a>(&self, collection: &'a TimerCollection) -> Vec<CategoryGroup<'a>> {
        group_by_category(collection)
            .into_iter()
            .filter(|group| self.filter.matches(group.category))
            .map(|group| CategoryGroup {
                expanded: self.is_expanded(group.category),
                ..group
            })
            .collect()
    }
}

/// Every category present, in order of first appearance
pub fn categories(collection: &TimerCollection) -> Vec<&str> {
    let mut seen = Vec::new();
    for timer in collection {
        if !seen.contains(&timer.category.as_str()) {
            seen.push(timer.category.as_str());
        }
    }
    seen
}

/// Group all timers by category, collapsed
pub fn group_by_category(collection: &TimerCollection) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for timer in collection {
        match groups.iter_mut().find(|g| g.category == timer.category) {
            Some(group) => group.timers.push(timer),
            None => groups.push(CategoryGroup {
                category: &timer.category,
                expanded: false,
                timers: vec![timer],
            }),
        }
    }
    groups
}
