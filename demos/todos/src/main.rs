//! CLI demo for the todos example.
//!
//! Runs each todos endpoint, then a users retrieve that refreshes the todo
//! list, printing the store snapshots as JSON. Set `RUST_LOG=debug` to see the
//! request lifecycle.

use todos_demo::{todos_store, users_store, CreateTodo, UpdateTodo};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Fetch Store Example ===\n");

    let todos = todos_store();
    let users = users_store(&todos);

    println!("Retrieving todo 1...");
    let retrieve = todos.actions().retrieve_action("1".to_string());
    let loading = todos.computed(|getters, state| getters.retrieve_computed(state).is_loading);
    println!("  loading while in flight: {loading:?}");
    retrieve.await;
    let todo = todos.computed(|getters, state| getters.retrieve_computed(state).data);
    println!("  retrieved: {todo:?}");

    println!("\nListing twice at once (the second call is dropped)...");
    tokio::join!(todos.actions().list_action(), todos.actions().list_action());

    println!("\nCreating a todo...");
    todos
        .actions()
        .create_action(CreateTodo {
            name: "Write documentation".to_string(),
            is_completed: false,
        })
        .await;

    println!("\nCompleting todo 1...");
    todos
        .actions()
        .update_action(UpdateTodo {
            id: "1".to_string(),
            is_completed: Some(true),
            ..UpdateTodo::default()
        })
        .await;

    println!("\nDeleting todo 1...");
    todos.actions().delete_action("1".to_string()).await;

    println!("\nRetrieving user 42 (refreshes todos)...");
    users.actions().retrieve_action("42".to_string()).await;

    println!("\nTodos store phases:");
    for (endpoint, phase) in todos.phases() {
        println!("  {endpoint:<8} {phase}");
    }

    println!("\nTodos state:\n{}", serde_json::to_string_pretty(&todos.snapshot())?);
    println!("\nUsers state:\n{}", serde_json::to_string_pretty(&users.snapshot())?);

    println!("\n=== Demo Complete ===");
    Ok(())
}
