use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::{find_vault_root, VaultConfig, HOME_ENV, VAULT_DIR};
use crate::csv::{export_filename, export_prompts_to_csv, format_timestamp, ExportKind};
use crate::entity::{Prompt, PromptDraft, UNCATEGORIZED};
use crate::error::{Result, VaultError};
use crate::import::{import_csv_file, ImportResult};
use crate::search::{filter_prompts, search_by_query, tag_counts, CategoryScope, PromptFilter, SortOption};
use crate::storage::{DualStore, JsonFileBackend, SqliteBackend};
use crate::template::{extract_variables, fill_template};
use crate::vault::Vault;

type VaultStore = DualStore<SqliteBackend, JsonFileBackend>;

/// Locate an initialized `.promptvault/` directory
fn vault_dir() -> Result<PathBuf> {
    let dir = find_vault_root().join(VAULT_DIR);
    if !dir.exists() {
        return Err(VaultError::NotInitialized);
    }
    Ok(dir)
}

fn open_store(vault_dir: &Path) -> Result<VaultStore> {
    let config = VaultConfig::load(vault_dir)?;
    DualStore::new(
        SqliteBackend::new(&config.primary_path(vault_dir)),
        JsonFileBackend::new(&config.fallback_path(vault_dir)),
        config.write_policy,
    )
}

async fn open_vault() -> Result<(VaultStore, Vault)> {
    let store = open_store(&vault_dir()?)?;
    let vault = Vault::load(&store).await;
    Ok((store, vault))
}

/// Save both collections and wait for the background writes before exiting
async fn persist(store: &VaultStore, vault: &Vault) {
    vault.save(store);
    store.flush().await;
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn is_uncategorized_name(name: &str) -> bool {
    name.is_empty() || name.eq_ignore_ascii_case(UNCATEGORIZED)
}

/// Category id for a name or id; optionally create unknown names.
fn resolve_category_id(vault: &mut Vault, key: &str, create: bool) -> Result<String> {
    let key = key.trim();
    if is_uncategorized_name(key) {
        return Ok(String::new());
    }
    if let Some(category) = vault.category(key).or_else(|| vault.category_by_name(key)) {
        return Ok(category.id.clone());
    }
    if !create {
        return Err(VaultError::CategoryNotFound(key.to_string()));
    }
    let category = vault.add_category(key)?;
    println!("Created category \"{}\"", category.name);
    Ok(category.id.clone())
}

fn print_prompt_line(vault: &Vault, prompt: &Prompt) {
    println!(
        "  {} [{}] {}{}",
        short_id(&prompt.id),
        vault.category_name(&prompt.category_id),
        prompt.title,
        if prompt.is_favorite { " *" } else { "" }
    );
}

pub async fn handle_init() -> Result<()> {
    let root = match env::var_os(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => env::current_dir()?,
    };
    let dir = root.join(VAULT_DIR);

    if dir.exists() {
        return Err(VaultError::AlreadyInitialized);
    }

    fs::create_dir_all(&dir)?;
    VaultConfig::default().save(&dir)?;

    let store = open_store(&dir)?;
    let vault = Vault::load(&store).await;
    persist(&store, &vault).await;

    println!("Initialized promptvault in {}", root.display());
    Ok(())
}

pub async fn handle_add(
    title: String,
    content: Option<String>,
    stdin: bool,
    category: Option<String>,
    tags: Vec<String>,
    favorite: bool,
    template: bool,
    json: bool,
) -> Result<()> {
    let (store, mut vault) = open_vault().await?;

    let content = if stdin {
        read_stdin()?
    } else {
        content.unwrap_or_default()
    };

    let category_id = match category {
        Some(name) => resolve_category_id(&mut vault, &name, true)?,
        None => String::new(),
    };

    let prompt = vault
        .add_prompt(PromptDraft {
            title,
            content,
            category_id,
            tags,
            is_favorite: favorite,
            is_template: template,
        })?
        .clone();

    persist(&store, &vault).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("Created prompt {} - {}", short_id(&prompt.id), prompt.title);
    }

    Ok(())
}

pub async fn handle_list(
    category: Option<String>,
    tag: Option<String>,
    favorites: bool,
    sort: String,
    json: bool,
) -> Result<()> {
    let (_store, vault) = open_vault().await?;

    let sort: SortOption = sort.parse().map_err(VaultError::Validation)?;

    let scope = match category.as_deref().map(str::trim) {
        None => CategoryScope::All,
        Some(name) if is_uncategorized_name(name) => CategoryScope::Uncategorized,
        Some(name) => {
            let category = vault
                .category(name)
                .or_else(|| vault.category_by_name(name))
                .ok_or_else(|| VaultError::CategoryNotFound(name.to_string()))?;
            CategoryScope::Id(category.id.clone())
        }
    };

    let filter = PromptFilter {
        category: scope,
        tag,
        query: None,
        favorites_only: favorites,
    };
    let prompts = filter_prompts(&vault.prompts, &vault.categories, &filter, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
    } else if prompts.is_empty() {
        println!("No prompts found.");
    } else {
        println!(
            "{} {}",
            prompts.len(),
            if prompts.len() == 1 { "prompt" } else { "prompts" }
        );
        for prompt in prompts {
            print_prompt_line(&vault, prompt);
        }
    }

    Ok(())
}

pub async fn handle_get(id: String, json: bool) -> Result<()> {
    let (_store, vault) = open_vault().await?;
    let prompt = vault.find_prompt(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(prompt)?);
        return Ok(());
    }

    println!("{}", prompt.title);
    println!("  id:        {}", prompt.id);
    println!("  category:  {}", vault.category_name(&prompt.category_id));
    if !prompt.tags.is_empty() {
        println!("  tags:      {}", prompt.tags.join(", "));
    }
    println!("  favorite:  {}", if prompt.is_favorite { "yes" } else { "no" });
    if prompt.is_template {
        println!("  variables: {}", extract_variables(&prompt.content).join(", "));
    }
    println!("  created:   {}", format_timestamp(prompt.created_at)?);
    println!("  updated:   {}", format_timestamp(prompt.updated_at)?);
    println!();
    println!("{}", prompt.content);

    Ok(())
}

pub async fn handle_edit(
    id: String,
    title: Option<String>,
    content: Option<String>,
    stdin: bool,
    category: Option<String>,
    tags: Vec<String>,
    template: Option<bool>,
    json: bool,
) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let existing = vault.find_prompt(&id)?.clone();

    let content = if stdin {
        read_stdin()?
    } else {
        content.unwrap_or(existing.content)
    };

    let category_id = match category {
        Some(name) => resolve_category_id(&mut vault, &name, true)?,
        None => existing.category_id,
    };

    let draft = PromptDraft {
        title: title.unwrap_or(existing.title),
        content,
        category_id,
        tags: if tags.is_empty() { existing.tags } else { tags },
        is_favorite: existing.is_favorite,
        is_template: template.unwrap_or(existing.is_template),
    };
    let prompt = vault.update_prompt(&existing.id, draft)?.clone();

    persist(&store, &vault).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("Updated prompt {} - {}", short_id(&prompt.id), prompt.title);
    }

    Ok(())
}

pub async fn handle_delete(id: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let removed = vault.delete_prompt(&id)?;
    persist(&store, &vault).await;

    println!("Deleted prompt {} - {}", short_id(&removed.id), removed.title);
    Ok(())
}

pub async fn handle_favorite(id: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let is_favorite = vault.toggle_favorite(&id)?;
    let title = vault.find_prompt(&id)?.title.clone();
    persist(&store, &vault).await;

    if is_favorite {
        println!("Added to favorites: {}", title);
    } else {
        println!("Removed from favorites: {}", title);
    }
    Ok(())
}

pub async fn handle_search(query: String, json: bool) -> Result<()> {
    let (_store, vault) = open_vault().await?;
    let results = search_by_query(&query, &vault.prompts, &vault.categories);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for '{}'.", query);
        return Ok(());
    }

    println!("Search results for '{}':", query);
    if !results.categories.is_empty() {
        println!("\nCategories:");
        for category in &results.categories {
            println!("  {}", category.name);
        }
    }
    if !results.tags.is_empty() {
        println!("\nTags:");
        for tag in &results.tags {
            println!("  #{}", tag);
        }
    }
    if !results.prompts.is_empty() {
        println!("\nPrompts:");
        for prompt in &results.prompts {
            print_prompt_line(&vault, prompt);
        }
    }

    Ok(())
}

pub async fn handle_category_add(name: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let category = vault.add_category(&name)?.clone();
    persist(&store, &vault).await;

    println!("Created category \"{}\" ({})", category.name, short_id(&category.id));
    Ok(())
}

fn existing_category_id(vault: &Vault, key: &str) -> Result<String> {
    vault
        .category(key)
        .or_else(|| vault.category_by_name(key))
        .map(|c| c.id.clone())
        .ok_or_else(|| VaultError::CategoryNotFound(key.to_string()))
}

pub async fn handle_category_rename(category: String, name: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let id = existing_category_id(&vault, &category)?;
    vault.rename_category(&id, &name)?;
    persist(&store, &vault).await;

    println!("Renamed category \"{}\" to \"{}\"", category, vault.category_name(&id));
    Ok(())
}

pub async fn handle_category_delete(category: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let id = existing_category_id(&vault, &category)?;
    let cleared = vault.delete_category(&id)?;
    persist(&store, &vault).await;

    println!("Deleted category \"{}\"", category);
    if cleared > 0 {
        println!("  {} prompt(s) are now uncategorized", cleared);
    }
    Ok(())
}

pub async fn handle_category_list(json: bool) -> Result<()> {
    let (_store, vault) = open_vault().await?;

    let count_in = |scope: &CategoryScope| {
        vault
            .prompts
            .iter()
            .filter(|p| scope.contains(p, &vault.categories))
            .count()
    };

    if json {
        #[derive(serde::Serialize)]
        struct CategoryJson<'a> {
            id: &'a str,
            name: &'a str,
            prompts: usize,
        }

        let json_categories: Vec<CategoryJson> = vault
            .categories
            .iter()
            .map(|c| CategoryJson {
                id: &c.id,
                name: &c.name,
                prompts: count_in(&CategoryScope::Id(c.id.clone())),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_categories)?);
        return Ok(());
    }

    for category in &vault.categories {
        let scope = CategoryScope::Id(category.id.clone());
        let tags = tag_counts(&vault.prompts, &vault.categories, &scope);
        println!(
            "  {} ({} prompts, {} tags)",
            category.name,
            count_in(&scope),
            tags.len()
        );
    }
    println!(
        "  {} ({} prompts)",
        UNCATEGORIZED,
        count_in(&CategoryScope::Uncategorized)
    );

    Ok(())
}

pub async fn handle_tag(ids: Vec<String>, add: Vec<String>, remove: Vec<String>) -> Result<()> {
    if add.is_empty() && remove.is_empty() {
        return Err(VaultError::Validation(
            "pass at least one --add or --remove tag".to_string(),
        ));
    }

    let (store, mut vault) = open_vault().await?;
    vault.apply_bulk_tags(&ids, &add, &remove)?;
    persist(&store, &vault).await;

    println!("Updated tags on {} prompt(s)", ids.len());
    Ok(())
}

pub async fn handle_move(ids: Vec<String>, category: String) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let category_id = resolve_category_id(&mut vault, &category, false)?;
    let moved = vault.move_prompts(&ids, &category_id)?;
    persist(&store, &vault).await;

    println!(
        "Moved {} prompt(s) to {}",
        moved,
        vault.category_name(&category_id)
    );
    Ok(())
}

fn print_import_report(result: &ImportResult, dry_run: bool) {
    if result.success {
        println!(
            "{} {} prompt(s)",
            if dry_run { "Would import" } else { "Imported" },
            result.prompts_imported
        );
    } else {
        println!("Import failed");
    }

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  - {}", error);
        }
    }
    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}

pub async fn handle_import(file: PathBuf, dry_run: bool, json: bool) -> Result<()> {
    let (store, mut vault) = open_vault().await?;
    let outcome = import_csv_file(&file, &vault.categories).await;
    let result = outcome.result.clone();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_import_report(&result, dry_run);
    }

    if !result.success {
        return Err(VaultError::ImportFailed(result.errors.len()));
    }

    if !dry_run {
        vault.merge_import(outcome);
        persist(&store, &vault).await;
    }

    Ok(())
}

pub async fn handle_export(output: Option<PathBuf>, stdout: bool, ids: Vec<String>) -> Result<()> {
    let (_store, vault) = open_vault().await?;

    let (prompts, kind) = if ids.is_empty() {
        (vault.prompts.clone(), ExportKind::Backup)
    } else {
        let selected = ids
            .iter()
            .map(|id| vault.find_prompt(id).cloned())
            .collect::<Result<Vec<_>>>()?;
        (selected, ExportKind::Selection)
    };

    let csv = export_prompts_to_csv(&prompts, &vault.categories)?;

    if stdout {
        print!("{}", csv);
        return Ok(());
    }

    let filename = export_filename(kind, Utc::now().date_naive());
    let path = match output {
        Some(dir) if dir.is_dir() => dir.join(filename),
        Some(path) => path,
        None => PathBuf::from(filename),
    };
    fs::write(&path, csv)?;

    println!("Exported {} prompt(s) to {}", prompts.len(), path.display());
    Ok(())
}

fn parse_vars(vars: &[String]) -> Result<HashMap<String, String>> {
    vars.iter()
        .map(|var| {
            var.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| {
                    VaultError::Validation(format!("invalid --var '{}', expected name=value", var))
                })
        })
        .collect()
}

pub async fn handle_fill(id: String, vars: Vec<String>) -> Result<()> {
    let values = parse_vars(&vars)?;
    let (_store, vault) = open_vault().await?;
    let prompt = vault.find_prompt(&id)?;

    for name in extract_variables(&prompt.content) {
        if !values.contains_key(&name) {
            eprintln!("Warning: no value for {{{}}}, leaving it empty", name);
        }
    }

    println!("{}", fill_template(&prompt.content, &values));
    Ok(())
}
