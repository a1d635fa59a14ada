mod commands;
mod handlers;

pub use commands::{CategoryAction, CategoryCommand, Cli, Commands};
pub use handlers::{
    handle_add, handle_category_add, handle_category_delete, handle_category_list,
    handle_category_rename, handle_delete, handle_edit, handle_export, handle_favorite,
    handle_fill, handle_get, handle_import, handle_init, handle_list, handle_move, handle_search,
    handle_tag,
};
