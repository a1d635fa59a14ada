//! The in-memory prompt library and its persistence through [`DualStore`].

use crate::entity::{Category, Prompt, PromptDraft, UNCATEGORIZED};
use crate::error::{Result, VaultError};
use crate::import::ImportOutcome;
use crate::storage::{DualStore, FallbackBackend, PrimaryBackend, CATEGORIES_KEY, PROMPTS_KEY};

/// Categories offered on first run
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::with_id("1", "Coding"),
        Category::with_id("2", "Writing"),
        Category::with_id("3", "Marketing"),
        Category::with_id("4", "Productivity"),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct Vault {
    pub categories: Vec<Category>,
    pub prompts: Vec<Prompt>,
}

impl Vault {
    /// Load both collections, seeding defaults when nothing is stored.
    pub async fn load<P: PrimaryBackend, F: FallbackBackend>(store: &DualStore<P, F>) -> Self {
        let categories = store.load(CATEGORIES_KEY, default_categories()).await;
        let prompts = store.load(PROMPTS_KEY, Vec::new()).await;
        Self {
            categories,
            prompts,
        }
    }

    pub fn save<P: PrimaryBackend, F: FallbackBackend>(&self, store: &DualStore<P, F>) {
        store.save(CATEGORIES_KEY, &self.categories);
        store.save(PROMPTS_KEY, &self.prompts);
    }

    // Categories

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Display name for a category id; empty and dangling ids are uncategorized.
    pub fn category_name(&self, id: &str) -> &str {
        self.category(id).map(|c| c.name.as_str()).unwrap_or(UNCATEGORIZED)
    }

    pub fn add_category(&mut self, name: &str) -> Result<&Category> {
        let name = self.validate_category_name(name, None)?;
        self.categories.push(Category::new(name));
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn rename_category(&mut self, id: &str, name: &str) -> Result<()> {
        let name = self.validate_category_name(name, Some(id))?;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| VaultError::CategoryNotFound(id.to_string()))?;
        category.name = name;
        Ok(())
    }

    /// Remove a category. Its prompts become uncategorized.
    ///
    /// Returns the number of prompts that lost their category.
    pub fn delete_category(&mut self, id: &str) -> Result<usize> {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return Err(VaultError::CategoryNotFound(id.to_string()));
        }

        let mut cleared = 0;
        for prompt in self.prompts.iter_mut().filter(|p| p.category_id == id) {
            prompt.category_id.clear();
            prompt.touch();
            cleared += 1;
        }
        Ok(cleared)
    }

    fn validate_category_name(&self, name: &str, renaming: Option<&str>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::Validation("category name is required".to_string()));
        }
        let taken = self
            .categories
            .iter()
            .any(|c| c.name == name && Some(c.id.as_str()) != renaming);
        if taken {
            return Err(VaultError::DuplicateCategory(name.to_string()));
        }
        Ok(name.to_string())
    }

    // Prompts

    /// Look up a prompt by full id or unique id prefix.
    pub fn find_prompt(&self, id: &str) -> Result<&Prompt> {
        if let Some(prompt) = self.prompts.iter().find(|p| p.id == id) {
            return Ok(prompt);
        }
        let mut candidates = self.prompts.iter().filter(|p| p.id.starts_with(id));
        match (candidates.next(), candidates.next()) {
            (Some(prompt), None) if !id.is_empty() => Ok(prompt),
            (Some(_), Some(_)) => Err(VaultError::AmbiguousId(id.to_string())),
            _ => Err(VaultError::PromptNotFound(id.to_string())),
        }
    }

    fn prompt_mut(&mut self, id: &str) -> Result<&mut Prompt> {
        let id = self.find_prompt(id)?.id.clone();
        self.prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(VaultError::PromptNotFound(id))
    }

    /// Create a prompt from a draft and place it first in the library.
    pub fn add_prompt(&mut self, draft: PromptDraft) -> Result<&Prompt> {
        let draft = validate_draft(draft)?;
        let mut prompt = Prompt::new(draft.title, draft.content);
        prompt.category_id = draft.category_id;
        prompt.tags = draft.tags;
        prompt.is_favorite = draft.is_favorite;
        prompt.is_template = draft.is_template;
        self.prompts.insert(0, prompt);
        Ok(&self.prompts[0])
    }

    /// Replace the editable fields of a prompt. `created_at` is kept.
    pub fn update_prompt(&mut self, id: &str, draft: PromptDraft) -> Result<&Prompt> {
        let draft = validate_draft(draft)?;
        let prompt = self.prompt_mut(id)?;
        prompt.title = draft.title;
        prompt.content = draft.content;
        prompt.category_id = draft.category_id;
        prompt.tags = draft.tags;
        prompt.is_favorite = draft.is_favorite;
        prompt.is_template = draft.is_template;
        prompt.touch();
        Ok(&*prompt)
    }

    pub fn delete_prompt(&mut self, id: &str) -> Result<Prompt> {
        let id = self.find_prompt(id)?.id.clone();
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| VaultError::PromptNotFound(id.clone()))?;
        Ok(self.prompts.remove(index))
    }

    /// Flip the favorite flag, returning the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let prompt = self.prompt_mut(id)?;
        prompt.is_favorite = !prompt.is_favorite;
        prompt.touch();
        Ok(prompt.is_favorite)
    }

    /// Put every listed prompt in one category (empty id to uncategorize).
    pub fn move_prompts(&mut self, ids: &[String], category_id: &str) -> Result<usize> {
        if !category_id.is_empty() && self.category(category_id).is_none() {
            return Err(VaultError::CategoryNotFound(category_id.to_string()));
        }
        let mut moved = 0;
        for id in ids {
            let prompt = self.prompt_mut(id)?;
            if prompt.category_id != category_id {
                prompt.category_id = category_id.to_string();
                prompt.touch();
                moved += 1;
            }
        }
        Ok(moved)
    }

    /// Remove then add tags on every listed prompt, without duplicating tags.
    pub fn apply_bulk_tags(&mut self, ids: &[String], add: &[String], remove: &[String]) -> Result<()> {
        for id in ids {
            let prompt = self.prompt_mut(id)?;
            let before = prompt.tags.clone();
            prompt.tags.retain(|t| !remove.contains(t));
            for tag in add {
                if !prompt.has_tag(tag) {
                    prompt.tags.push(tag.clone());
                }
            }
            if prompt.tags != before {
                prompt.touch();
            }
        }
        Ok(())
    }

    /// Take the reconciled categories and append the imported prompts.
    pub fn merge_import(&mut self, outcome: ImportOutcome) -> usize {
        let count = outcome.prompts.len();
        self.categories = outcome.categories;
        self.prompts.extend(outcome.prompts);
        count
    }
}

fn validate_draft(mut draft: PromptDraft) -> Result<PromptDraft> {
    draft.title = draft.title.trim().to_string();
    draft.content = draft.content.trim().to_string();
    if draft.title.is_empty() {
        return Err(VaultError::Validation("title is required".to_string()));
    }
    if draft.content.is_empty() {
        return Err(VaultError::Validation("content is required".to_string()));
    }
    draft.tags = draft
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    Ok(draft)
}
