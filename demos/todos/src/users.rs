//! The users store, composed with the todos store.
//!
//! Retrieving a user also refreshes the todo list by calling the todos
//! store's `list` action from inside the request function.

use crate::todos::{TodosActions, TodosState};
use crate::types::User;
use fetch_store_core::{Endpoint, RequestState, StoreDefinition};
use fetch_store_macros::FetchStore;
use fetch_store_runtime::Store;
use serde::Serialize;

/// State of the users store
#[derive(FetchStore, Clone, Debug, PartialEq, Serialize)]
pub struct UsersState {
    /// Users matching an id
    #[endpoint(arg = String)]
    pub retrieve: RequestState<Vec<User>>,
}

/// Definition of the users store, driving `todos` on every retrieve
#[must_use]
pub fn definition(todos: TodosActions) -> StoreDefinition<UsersState> {
    StoreDefinition::<UsersState>::create(move |builder| UsersEndpoints {
        retrieve: builder.create(Endpoint::new(move |_, id: String| {
            let todos = todos.clone();
            async move {
                tracing::info!(%id, "Retrieving user");
                let users = vec![User {
                    id,
                    name: "Jon Doe".to_string(),
                }];

                todos.list_action().await;
                Ok(users)
            }
        })),
    })
}

/// Register the users store under `"users"`, wired to `todos`
#[must_use]
pub fn users_store(todos: &Store<TodosState>) -> Store<UsersState> {
    Store::new("users", &definition(todos.actions().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todos::todos_store;
    use crate::types::Todo;
    use fetch_store_core::RequestPhase;
    use fetch_store_testing::assertions;

    #[tokio::test]
    async fn test_retrieve_refreshes_todo_list() {
        let todos = todos_store();
        let users = users_store(&todos);

        users.actions().retrieve_action("42".to_string()).await;

        users.state(|s| {
            assertions::assert_fulfilled(
                &s.retrieve,
                &vec![User {
                    id: "42".to_string(),
                    name: "Jon Doe".to_string(),
                }],
            );
        });
        todos.state(|s| {
            assertions::assert_fulfilled(
                &s.list,
                &vec![Todo::new("1", "Lunch with Joe Doe", false)],
            );
        });
    }

    #[tokio::test]
    async fn test_users_store_leaves_other_todo_slices_alone() {
        let todos = todos_store();
        let users = users_store(&todos);

        users.actions().retrieve_action("7".to_string()).await;

        assert_eq!(
            todos.phases(),
            vec![
                ("create", RequestPhase::Idle),
                ("retrieve", RequestPhase::Idle),
                ("list", RequestPhase::Fulfilled),
                ("update", RequestPhase::Idle),
                ("delete", RequestPhase::Idle),
            ]
        );
    }
}
