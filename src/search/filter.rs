// src/search/filter.rs
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::entity::{Category, Prompt};

/// Which category a listing is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryScope {
    #[default]
    All,
    /// Prompts with no category or a dangling one
    Uncategorized,
    Id(String),
}

impl CategoryScope {
    pub fn contains(&self, prompt: &Prompt, categories: &[Category]) -> bool {
        match self {
            CategoryScope::All => true,
            CategoryScope::Uncategorized => is_uncategorized(prompt, categories),
            CategoryScope::Id(id) => prompt.category_id == *id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    Az,
    Za,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortOption::Newest),
            "oldest" => Ok(SortOption::Oldest),
            "az" | "a-z" => Ok(SortOption::Az),
            "za" | "z-a" => Ok(SortOption::Za),
            _ => Err(format!("Invalid sort option: {} (expected newest, oldest, az, za)", s)),
        }
    }
}

/// Criteria for the main prompt listing. All set criteria must match.
#[derive(Debug, Clone, Default)]
pub struct PromptFilter {
    pub category: CategoryScope,
    pub tag: Option<String>,
    /// Case-insensitive substring over title, content and tags
    pub query: Option<String>,
    pub favorites_only: bool,
}

impl PromptFilter {
    pub fn matches(&self, prompt: &Prompt, categories: &[Category]) -> bool {
        if !self.category.contains(prompt, categories) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !prompt.has_tag(tag) {
                return false;
            }
        }
        if self.favorites_only && !prompt.is_favorite {
            return false;
        }
        match &self.query {
            Some(query) => {
                let needle = query.to_lowercase();
                prompt.title.to_lowercase().contains(&needle)
                    || prompt.content.to_lowercase().contains(&needle)
                    || prompt.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

pub fn is_uncategorized(prompt: &Prompt, categories: &[Category]) -> bool {
    prompt.category_id.is_empty() || !categories.iter().any(|c| c.id == prompt.category_id)
}

fn compare_titles(a: &Prompt, b: &Prompt) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// Apply `filter` and order the survivors by `sort`.
pub fn filter_prompts<'a>(
    prompts: &'a [Prompt],
    categories: &[Category],
    filter: &PromptFilter,
    sort: SortOption,
) -> Vec<&'a Prompt> {
    let mut matched: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| filter.matches(p, categories))
        .collect();

    match sort {
        SortOption::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Oldest => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::Az => matched.sort_by(|a, b| compare_titles(a, b)),
        SortOption::Za => matched.sort_by(|a, b| compare_titles(b, a)),
    }

    matched
}

/// Number of prompts carrying each tag within a category scope.
pub fn tag_counts(
    prompts: &[Prompt],
    categories: &[Category],
    scope: &CategoryScope,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for prompt in prompts.iter().filter(|p| scope.contains(p, categories)) {
        for tag in &prompt.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(title: &str, category_id: &str, created_at: i64, tags: &[&str]) -> Prompt {
        let mut p = Prompt::new_at(title.to_string(), "content".to_string(), created_at);
        p.category_id = category_id.to_string();
        p.tags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    fn fixtures() -> (Vec<Prompt>, Vec<Category>) {
        let mut fav = prompt("beta", "1", 30, &["rust"]);
        fav.is_favorite = true;
        let prompts = vec![
            prompt("Alpha", "1", 10, &["rust", "cli"]),
            fav,
            prompt("gamma", "", 20, &["cli"]),
            prompt("Delta", "deleted", 40, &[]),
        ];
        (prompts, vec![Category::with_id("1", "Coding")])
    }

    fn titles(prompts: &[&Prompt]) -> Vec<String> {
        prompts.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let (prompts, categories) = fixtures();
        let filter = PromptFilter::default();

        let newest = filter_prompts(&prompts, &categories, &filter, SortOption::Newest);
        assert_eq!(titles(&newest), vec!["Delta", "beta", "gamma", "Alpha"]);

        let oldest = filter_prompts(&prompts, &categories, &filter, SortOption::Oldest);
        assert_eq!(titles(&oldest), vec!["Alpha", "gamma", "beta", "Delta"]);

        let az = filter_prompts(&prompts, &categories, &filter, SortOption::Az);
        assert_eq!(titles(&az), vec!["Alpha", "beta", "Delta", "gamma"]);

        let za = filter_prompts(&prompts, &categories, &filter, SortOption::Za);
        assert_eq!(titles(&za), vec!["gamma", "Delta", "beta", "Alpha"]);
    }

    #[test]
    fn test_uncategorized_includes_dangling() {
        let (prompts, categories) = fixtures();
        let filter = PromptFilter {
            category: CategoryScope::Uncategorized,
            ..Default::default()
        };
        let result = filter_prompts(&prompts, &categories, &filter, SortOption::Az);
        assert_eq!(titles(&result), vec!["Delta", "gamma"]);
    }

    #[test]
    fn test_combined_criteria() {
        let (prompts, categories) = fixtures();
        let filter = PromptFilter {
            category: CategoryScope::Id("1".to_string()),
            tag: Some("rust".to_string()),
            query: None,
            favorites_only: true,
        };
        let result = filter_prompts(&prompts, &categories, &filter, SortOption::Newest);
        assert_eq!(titles(&result), vec!["beta"]);
    }

    #[test]
    fn test_query_filter() {
        let (prompts, categories) = fixtures();
        let filter = PromptFilter {
            query: Some("CLI".to_string()),
            ..Default::default()
        };
        let result = filter_prompts(&prompts, &categories, &filter, SortOption::Az);
        assert_eq!(titles(&result), vec!["Alpha", "gamma"]);
    }

    #[test]
    fn test_tag_counts_by_scope() {
        let (prompts, categories) = fixtures();

        let all = tag_counts(&prompts, &categories, &CategoryScope::All);
        assert_eq!(all.get("rust"), Some(&2));
        assert_eq!(all.get("cli"), Some(&2));

        let coding = tag_counts(&prompts, &categories, &CategoryScope::Id("1".to_string()));
        assert_eq!(coding.get("cli"), Some(&1));
    }

    #[test]
    fn test_sort_option_parse() {
        assert_eq!("A-Z".parse::<SortOption>().unwrap(), SortOption::Az);
        assert_eq!("oldest".parse::<SortOption>().unwrap(), SortOption::Oldest);
        assert!("random".parse::<SortOption>().is_err());
    }
}
