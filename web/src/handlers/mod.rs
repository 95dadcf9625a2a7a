//! HTTP request handlers.

pub mod health;
pub mod todos;

pub use health::{health_check, render_metrics};
pub use todos::{
    clear_todos, create_todo, delete_todo, get_todo, list_todos, replace_todo, update_todo,
};
