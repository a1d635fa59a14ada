// src/import/reconcile.rs
use std::collections::HashMap;

use serde::Serialize;

use crate::csv::Row;
use crate::entity::{now_millis, Category, Prompt, UNCATEGORIZED};
use crate::error::Result;

const EMPTY_FILE: &str = "CSV file is empty";
const MISSING_COLUMNS: &str = "CSV must contain \"Title\" and \"Content\" columns";

/// Report shown to the user after an import attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// True iff `errors` is empty
    pub success: bool,
    pub prompts_imported: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Everything an import produces. The caller decides whether to keep it.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Accepted rows, in file order
    pub prompts: Vec<Prompt>,
    /// The caller's categories followed by any created during the import
    pub categories: Vec<Category>,
    pub result: ImportResult,
}

impl ImportOutcome {
    pub(crate) fn failed(existing: &[Category], error: String) -> Self {
        Self {
            prompts: Vec::new(),
            categories: existing.to_vec(),
            result: ImportResult {
                success: false,
                prompts_imported: 0,
                errors: vec![error],
                warnings: Vec::new(),
            },
        }
    }
}

/// Column positions resolved from the header row.
struct Columns {
    title: usize,
    content: usize,
    category: Option<usize>,
    tags: Option<usize>,
    favorite: Option<usize>,
    is_template: Option<usize>,
}

impl Columns {
    /// Returns `None` when either required column is missing.
    fn from_header(header: &[String]) -> Option<Self> {
        let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        Some(Self {
            title: find("title")?,
            content: find("content")?,
            category: find("category"),
            tags: find("tags"),
            favorite: find("favorite"),
            is_template: find("istemplate"),
        })
    }

    /// Build a prompt from one data row, or `Ok(None)` if it must be skipped.
    fn read_row(
        &self,
        row: &[String],
        categories: &mut CategoryResolver,
        warnings: &mut Vec<String>,
    ) -> Result<Option<Prompt>> {
        let title = cell(row, Some(self.title));
        let content = cell(row, Some(self.content));
        if title.is_empty() || content.is_empty() {
            return Ok(None);
        }

        let category_name = cell(row, self.category);
        let category_id = if category_name.is_empty() || category_name == UNCATEGORIZED {
            String::new()
        } else {
            categories.resolve(category_name, warnings)?
        };

        let mut prompt = Prompt::new_at(title.to_string(), content.to_string(), now_millis());
        prompt.category_id = category_id;
        prompt.tags = parse_tags(cell(row, self.tags));
        prompt.is_favorite = parse_flag(cell(row, self.favorite));
        prompt.is_template = parse_flag(cell(row, self.is_template));

        Ok(Some(prompt))
    }
}

/// Name -> id lookup for one reconciliation call, creating categories on demand.
struct CategoryResolver {
    categories: Vec<Category>,
    ids_by_name: HashMap<String, String>,
}

impl CategoryResolver {
    fn new(existing: &[Category]) -> Self {
        let ids_by_name = existing
            .iter()
            .map(|c| (c.name.clone(), c.id.clone()))
            .collect();
        Self {
            categories: existing.to_vec(),
            ids_by_name,
        }
    }

    fn resolve(&mut self, name: &str, warnings: &mut Vec<String>) -> Result<String> {
        if let Some(id) = self.ids_by_name.get(name) {
            return Ok(id.clone());
        }

        let category = Category::new(name);
        let id = category.id.clone();
        self.ids_by_name.insert(name.to_string(), id.clone());
        self.categories.push(category);
        warnings.push(format!("Created new category: \"{}\"", name));
        Ok(id)
    }
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Map tokenized rows onto prompts.
///
/// `rows[0]` is the header. Row numbers in warnings are 1-based with the
/// header as row 1.
pub fn reconcile(rows: &[Row], existing: &[Category]) -> ImportOutcome {
    let Some(header) = rows.first() else {
        return ImportOutcome::failed(existing, EMPTY_FILE.to_string());
    };

    let Some(columns) = Columns::from_header(header) else {
        return ImportOutcome::failed(existing, MISSING_COLUMNS.to_string());
    };

    let mut resolver = CategoryResolver::new(existing);
    let mut warnings = Vec::new();
    let mut prompts = Vec::new();

    for (index, row) in rows.iter().enumerate().skip(1) {
        let row_number = index + 1;
        match columns.read_row(row, &mut resolver, &mut warnings) {
            Ok(Some(prompt)) => prompts.push(prompt),
            Ok(None) => warnings.push(format!(
                "Row {}: Skipped (missing title or content)",
                row_number
            )),
            Err(e) => warnings.push(format!("Row {}: Error parsing row - {}", row_number, e)),
        }
    }

    tracing::info!(
        imported = prompts.len(),
        warnings = warnings.len(),
        new_categories = resolver.categories.len() - existing.len(),
        "reconciled CSV import"
    );

    let result = ImportResult {
        success: true,
        prompts_imported: prompts.len(),
        errors: Vec::new(),
        warnings,
    };

    ImportOutcome {
        prompts,
        categories: resolver.categories,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::export_prompts_to_csv;
    use crate::import::import_prompts_from_csv;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_example_scenario() {
        let input = rows(&[
            &["Title", "Content", "Category", "Tags", "Favorite"],
            &["Hello", "World", "Work", "a; b", "Yes"],
            &["", "Oops", "Work", "", ""],
        ]);

        let outcome = reconcile(&input, &[]);

        assert!(outcome.result.success);
        assert_eq!(outcome.result.prompts_imported, 1);
        assert_eq!(outcome.prompts.len(), 1);

        let prompt = &outcome.prompts[0];
        assert_eq!(prompt.title, "Hello");
        assert_eq!(prompt.content, "World");
        assert_eq!(prompt.tags, vec!["a", "b"]);
        assert!(prompt.is_favorite);
        assert!(!prompt.is_template);
        assert_eq!(prompt.created_at, prompt.updated_at);

        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(outcome.categories[0].name, "Work");
        assert_eq!(prompt.category_id, outcome.categories[0].id);

        assert_eq!(
            outcome.result.warnings,
            vec![
                "Created new category: \"Work\"".to_string(),
                "Row 3: Skipped (missing title or content)".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let existing = vec![Category::with_id("1", "Coding")];
        let outcome = reconcile(&[], &existing);

        assert!(!outcome.result.success);
        assert_eq!(outcome.result.errors, vec!["CSV file is empty".to_string()]);
        assert_eq!(outcome.result.prompts_imported, 0);
        assert_eq!(outcome.categories, existing);
    }

    #[test]
    fn test_missing_content_column_is_fatal() {
        let input = rows(&[&["Title", "Body"], &["Hello", "World"]]);
        let outcome = reconcile(&input, &[]);

        assert!(!outcome.result.success);
        assert_eq!(outcome.result.prompts_imported, 0);
        assert_eq!(
            outcome.result.errors,
            vec!["CSV must contain \"Title\" and \"Content\" columns".to_string()]
        );
        assert!(outcome.result.warnings.is_empty());
        assert!(outcome.prompts.is_empty());
    }

    #[test]
    fn test_header_case_and_order_insensitive() {
        let input = rows(&[
            &["  TAGS ", "extra", "CONTENT", "title", "isTemplate"],
            &["x;y", "ignored", "Body", "Head", "yes"],
        ]);
        let outcome = reconcile(&input, &[]);

        assert_eq!(outcome.prompts.len(), 1);
        let prompt = &outcome.prompts[0];
        assert_eq!(prompt.title, "Head");
        assert_eq!(prompt.content, "Body");
        assert_eq!(prompt.tags, vec!["x", "y"]);
        assert!(prompt.is_template);
        assert!(!prompt.is_favorite);
        assert!(prompt.category_id.is_empty());
    }

    #[test]
    fn test_row_missing_title_warns_with_row_number() {
        let input = rows(&[
            &["Title", "Content"],
            &["One", "Body"],
            &["", "Body"],
            &["Three", "Body"],
        ]);
        let outcome = reconcile(&input, &[]);

        assert!(outcome.result.success);
        assert_eq!(outcome.result.prompts_imported, 2);
        assert_eq!(outcome.result.warnings.len(), 1);
        assert!(outcome.result.warnings[0].contains("Row 3"));
    }

    #[test]
    fn test_short_row_is_skipped() {
        let input = rows(&[&["Title", "Content"], &["Only a title"]]);
        let outcome = reconcile(&input, &[]);

        assert!(outcome.result.success);
        assert!(outcome.prompts.is_empty());
        assert_eq!(
            outcome.result.warnings,
            vec!["Row 2: Skipped (missing title or content)".to_string()]
        );
    }

    #[test]
    fn test_existing_category_reused() {
        let existing = vec![Category::with_id("1", "Coding")];
        let input = rows(&[
            &["Title", "Content", "Category"],
            &["A", "a", "Coding"],
            &["B", "b", "Uncategorized"],
        ]);
        let outcome = reconcile(&input, &existing);

        assert_eq!(outcome.categories, existing);
        assert_eq!(outcome.prompts[0].category_id, "1");
        assert!(outcome.prompts[1].category_id.is_empty());
        assert!(outcome.result.warnings.is_empty());
    }

    #[test]
    fn test_category_lookup_is_case_sensitive() {
        let existing = vec![Category::with_id("1", "Coding")];
        let input = rows(&[&["Title", "Content", "Category"], &["A", "a", "coding"]]);
        let outcome = reconcile(&input, &existing);

        assert_eq!(outcome.categories.len(), 2);
        assert_eq!(outcome.categories[1].name, "coding");
    }

    #[test]
    fn test_new_category_created_once_per_batch() {
        let input = rows(&[
            &["Title", "Content", "Category"],
            &["A", "a", "Research"],
            &["B", "b", "Research"],
            &["C", "c", "Ideas"],
        ]);
        let outcome = reconcile(&input, &[]);

        assert_eq!(outcome.categories.len(), 2);
        assert_eq!(outcome.prompts[0].category_id, outcome.prompts[1].category_id);
        let created: Vec<_> = outcome
            .result
            .warnings
            .iter()
            .filter(|w| w.starts_with("Created new category"))
            .collect();
        assert_eq!(created.len(), 2);
    }

    #[test]
    fn test_category_creation_idempotence() {
        let text = "Title,Content,Category\nA,a,Research\nB,b,Ideas\n";

        let first = import_prompts_from_csv(text, &[]);
        let second = import_prompts_from_csv(text, &[]);
        assert_eq!(first.categories.len(), 2);
        assert_eq!(second.categories.len(), 2);

        let accumulated = import_prompts_from_csv(text, &first.categories);
        assert_eq!(accumulated.categories.len(), 2);
        assert!(accumulated.result.warnings.is_empty());
        assert_eq!(accumulated.prompts[0].category_id, first.prompts[0].category_id);
    }

    #[test]
    fn test_multiline_category_is_created() {
        let input = rows(&[
            &["Title", "Content", "Category"],
            &["A", "a", "Two\nLines"],
            &["B", "b", "Two\nLines"],
        ]);
        let outcome = reconcile(&input, &[]);

        assert!(outcome.result.success);
        assert_eq!(outcome.result.prompts_imported, 2);
        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(outcome.categories[0].name, "Two\nLines");
        assert_eq!(outcome.prompts[0].category_id, outcome.categories[0].id);
        assert_eq!(outcome.prompts[1].category_id, outcome.categories[0].id);
        assert_eq!(
            outcome.result.warnings,
            vec!["Created new category: \"Two\nLines\"".to_string()]
        );
    }

    #[test]
    fn test_multiline_category_survives_export_and_import() {
        let mut vault = crate::vault::Vault::default();
        let category_id = vault.add_category("Team\nNotes").unwrap().id.clone();
        vault
            .add_prompt(crate::entity::PromptDraft {
                title: "Standup".to_string(),
                content: "What did you ship?".to_string(),
                category_id,
                ..Default::default()
            })
            .unwrap();

        let csv = export_prompts_to_csv(&vault.prompts, &vault.categories).unwrap();
        let outcome = import_prompts_from_csv(&csv, &[]);

        assert!(outcome.result.success);
        assert_eq!(outcome.prompts.len(), 1);
        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(outcome.categories[0].name, "Team\nNotes");
        assert_eq!(outcome.prompts[0].category_id, outcome.categories[0].id);

        let again = import_prompts_from_csv(&csv, &outcome.categories);
        assert_eq!(again.categories.len(), 1);
        assert_eq!(again.prompts[0].category_id, outcome.categories[0].id);
        assert!(again.result.warnings.is_empty());
    }

    #[test]
    fn test_flags_parse_only_yes() {
        let input = rows(&[
            &["Title", "Content", "Favorite"],
            &["A", "a", " YES "],
            &["B", "b", "true"],
            &["C", "c", "No"],
        ]);
        let outcome = reconcile(&input, &[]);

        let flags: Vec<bool> = outcome.prompts.iter().map(|p| p.is_favorite).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_tags_drop_empty_parts() {
        assert_eq!(parse_tags(" a ;; b ; ;c"), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" ; ").is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let categories = vec![
            Category::with_id("1", "Coding"),
            Category::with_id("2", "Writing, \"Long form\""),
        ];

        let mut first = Prompt::new("Refactor \"this\"".to_string(), "Line one\nLine, two".to_string());
        first.category_id = "2".to_string();
        first.tags = vec!["rust".to_string(), "review".to_string()];
        first.is_favorite = true;

        let mut second = Prompt::new("Fill me".to_string(), "Hello {name}".to_string());
        second.is_template = true;
        second.category_id = "missing".to_string();

        let csv = export_prompts_to_csv(&[first.clone(), second.clone()], &categories).unwrap();
        let outcome = import_prompts_from_csv(&csv, &[]);

        assert!(outcome.result.success);
        assert_eq!(outcome.prompts.len(), 2);

        let names: HashMap<_, _> = outcome
            .categories
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();

        let a = &outcome.prompts[0];
        assert_eq!(a.title, first.title);
        assert_eq!(a.content, first.content);
        assert_eq!(a.tags, first.tags);
        assert!(a.is_favorite);
        assert!(!a.is_template);
        assert_eq!(names[&a.category_id], "Writing, \"Long form\"");

        let b = &outcome.prompts[1];
        assert_eq!(b.title, second.title);
        assert!(b.is_template);
        assert!(b.category_id.is_empty());
    }
}
