//! The todos store: CRUD endpoints over todo items.
//!
//! Deleting a todo refreshes the list through the store's own `list` action.

use crate::types::{CreateTodo, Todo, UpdateTodo};
use fetch_store_core::{
    create_fetch_store, Endpoint, EndpointBuilder, FetchStoreOptions, RequestState,
    StoreDefinition,
};
use fetch_store_macros::FetchStore;
use fetch_store_runtime::Store;
use serde::Serialize;

/// State of the todos store, one slice per endpoint
#[derive(FetchStore, Clone, Debug, PartialEq, Serialize)]
pub struct TodosState {
    /// Creates a todo from a [`CreateTodo`]
    #[endpoint(arg = CreateTodo)]
    pub create: RequestState<Todo>,
    /// Fetches one todo by id
    #[endpoint(arg = String)]
    pub retrieve: RequestState<Todo>,
    /// Fetches every todo
    pub list: RequestState<Vec<Todo>>,
    /// Applies an [`UpdateTodo`]
    #[endpoint(arg = UpdateTodo)]
    pub update: RequestState<Todo>,
    /// Deletes a todo by id, then refreshes the list
    #[endpoint(arg = String)]
    pub delete: RequestState<()>,
}

/// Definition of the todos store
#[must_use]
pub fn definition() -> StoreDefinition<TodosState> {
    create_fetch_store(FetchStoreOptions {
        endpoints: |builder: EndpointBuilder<TodosActions>| TodosEndpoints {
            create: builder.create(Endpoint::new(|_, new_todo: CreateTodo| async move {
                tracing::info!("Creating todo item");
                Ok(Todo::new("5", new_todo.name, new_todo.is_completed))
            })),
            retrieve: builder.create(Endpoint::new(|_, id: String| async move {
                tracing::info!(%id, "Retrieving todo item");
                Ok(Todo::new("1", "Lunch with Jon Doe", false))
            })),
            list: builder.create(Endpoint::new(|_, ()| async {
                tracing::info!("Listing todo items");
                Ok(vec![Todo::new("1", "Lunch with Joe Doe", false)])
            })),
            update: builder.create(Endpoint::new(|_, update: UpdateTodo| async move {
                tracing::info!(id = %update.id, "Updating todo item");
                Ok(Todo::new(
                    "1",
                    update.name.unwrap_or_else(|| "Lunch with Joe Doe".to_string()),
                    update.is_completed.unwrap_or(false),
                ))
            })),
            delete: builder.create(Endpoint::new(|actions: TodosActions, id: String| async move {
                tracing::info!(%id, "Deleting todo item");
                actions.list_action().await;
                Ok(())
            })),
        },
    })
}

/// Register the todos store under `"todos"`
#[must_use]
pub fn todos_store() -> Store<TodosState> {
    Store::new("todos", &definition())
}
