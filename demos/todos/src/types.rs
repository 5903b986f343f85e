//! Domain types for the todos demo.

use serde::{Deserialize, Serialize};

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: String,
    /// What needs doing
    pub name: String,
    /// Whether the todo is done
    pub is_completed: bool,
}

impl Todo {
    /// Creates a todo
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_completed: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_completed,
        }
    }
}

/// Payload for creating a todo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    /// What needs doing
    pub name: String,
    /// Whether the todo starts out done
    pub is_completed: bool,
}

/// Partial update of a todo; absent fields keep their value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    /// Todo to update
    pub id: String,
    /// New name
    pub name: Option<String>,
    /// New completion flag
    pub is_completed: Option<bool>,
}

/// A user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
}
