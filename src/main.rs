use clap::Parser;
use promptvault::cli::{
    handle_add, handle_category_add, handle_category_delete, handle_category_list,
    handle_category_rename, handle_delete, handle_edit, handle_export, handle_favorite,
    handle_fill, handle_get, handle_import, handle_init, handle_list, handle_move, handle_search,
    handle_tag, CategoryAction, Cli, Commands,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptvault=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init().await,
        Commands::Add {
            title,
            content,
            stdin,
            category,
            tags,
            favorite,
            template,
            json,
        } => handle_add(title, content, stdin, category, tags, favorite, template, json).await,
        Commands::List {
            category,
            tag,
            favorites,
            sort,
            json,
        } => handle_list(category, tag, favorites, sort, json).await,
        Commands::Get { id, json } => handle_get(id, json).await,
        Commands::Edit {
            id,
            title,
            content,
            stdin,
            category,
            tags,
            template,
            json,
        } => handle_edit(id, title, content, stdin, category, tags, template, json).await,
        Commands::Delete { id } => handle_delete(id).await,
        Commands::Favorite { id } => handle_favorite(id).await,
        Commands::Search { query, json } => handle_search(query, json).await,
        Commands::Category(category_cmd) => match category_cmd.action {
            CategoryAction::Add { name } => handle_category_add(name).await,
            CategoryAction::Rename { category, name } => handle_category_rename(category, name).await,
            CategoryAction::Delete { category } => handle_category_delete(category).await,
            CategoryAction::List { json } => handle_category_list(json).await,
        },
        Commands::Tag { ids, add, remove } => handle_tag(ids, add, remove).await,
        Commands::Move { ids, category } => handle_move(ids, category).await,
        Commands::Import {
            file,
            dry_run,
            json,
        } => handle_import(file, dry_run, json).await,
        Commands::Export { output, stdout, ids } => handle_export(output, stdout, ids).await,
        Commands::Fill { id, vars } => handle_fill(id, vars).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
