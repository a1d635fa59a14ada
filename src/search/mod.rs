//! Grouped search and list filtering over the prompt collections.

mod filter;

pub use filter::{filter_prompts, is_uncategorized, tag_counts, CategoryScope, PromptFilter, SortOption};

use std::collections::BTreeSet;

use serde::Serialize;

use crate::entity::{Category, Prompt};

/// Matches for one query, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedSearchResults {
    pub categories: Vec<Category>,
    /// Matching tag names, deduplicated and sorted
    pub tags: Vec<String>,
    pub prompts: Vec<Prompt>,
}

impl GroupedSearchResults {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty() && self.prompts.is_empty()
    }
}

/// Case-insensitive substring search across categories, tags and prompts.
///
/// A blank query matches nothing. A prompt is included when its title,
/// content or any tag matches; only the matching tags are reported.
pub fn search_by_query(
    query: &str,
    prompts: &[Prompt],
    categories: &[Category],
) -> GroupedSearchResults {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return GroupedSearchResults::default();
    }
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let matched_categories = categories
        .iter()
        .filter(|c| matches(c.name.as_str()))
        .cloned()
        .collect();

    let mut matched_tags = BTreeSet::new();
    let mut matched_prompts = Vec::new();

    for prompt in prompts {
        let mut hit = matches(prompt.title.as_str()) || matches(prompt.content.as_str());
        for tag in prompt.tags.iter().filter(|t| matches(t.as_str())) {
            matched_tags.insert(tag.clone());
            hit = true;
        }
        if hit {
            matched_prompts.push(prompt.clone());
        }
    }

    GroupedSearchResults {
        categories: matched_categories,
        tags: matched_tags.into_iter().collect(),
        prompts: matched_prompts,
    }
}
