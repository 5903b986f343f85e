//! Todos example demonstrating fetch stores.
//!
//! Two stores built from endpoint definitions:
//!
//! - **todos**: create, retrieve, list, update and delete endpoints; deleting
//!   refreshes the list from inside the request function
//! - **users**: a retrieve endpoint that also drives the todos store's `list`
//!   action, showing how stores compose
//!
//! # Quick Start
//!
//! ```no_run
//! use todos_demo::{todos_store, users_store};
//!
//! # async fn example() {
//! let todos = todos_store();
//! let users = users_store(&todos);
//!
//! users.actions().retrieve_action("42".to_string()).await;
//!
//! let listed = todos.computed(|getters, state| getters.list_computed(state).data);
//! println!("Todos: {listed:?}");
//! # }
//! ```

pub mod todos;
pub mod types;
pub mod users;

// Re-export commonly used types
pub use todos::{todos_store, TodosActions, TodosGetters, TodosState};
pub use types::{CreateTodo, Todo, UpdateTodo, User};
pub use users::{users_store, UsersActions, UsersGetters, UsersState};
