//! In-memory JSON placeholder API used as a live target for the gateway.
//!
//! Serves `/todos` CRUD in the style of jsonplaceholder (numeric ids, `{}`
//! for deletes and misses) plus diagnostic routes: `/echo` reflects the
//! request it received, `/malformed` answers with a non-JSON body and
//! `/binary` with bytes that are not UTF-8.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Body for `POST /todos` and `PUT /todos/{id}`.
#[derive(Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body for `PATCH /todos/{id}`.
#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug)]
pub struct Store {
    next_id: u64,
    todos: BTreeMap<u64, Todo>,
}

impl Store {
    /// Store holding todo `1`, like the public placeholder service.
    pub fn seeded() -> Self {
        let mut todos = BTreeMap::new();
        todos.insert(
            1,
            Todo {
                id: 1,
                title: "delectus aut autem".to_string(),
                completed: false,
            },
        );
        Self { next_id: 2, todos }
    }
}

pub type Db = Arc<RwLock<Store>>;

type Missing = (StatusCode, Json<Value>);

fn missing() -> Missing {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/echo", any(echo))
        .route("/malformed", get(malformed))
        .route("/binary", get(binary))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(store.todos.values().cloned().collect())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<NewTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut store = db.write().await;
    let todo = Todo {
        id: store.next_id,
        title: input.title,
        completed: input.completed,
    };
    store.next_id += 1;
    store.todos.insert(todo.id, todo.clone());
    (StatusCode::CREATED, Json(todo))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Todo>, Missing> {
    let store = db.read().await;
    store.todos.get(&id).cloned().map(Json).ok_or_else(missing)
}

async fn replace_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewTodo>,
) -> Result<Json<Todo>, Missing> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(missing)?;
    todo.title = input.title;
    todo.completed = input.completed;
    Ok(Json(todo.clone()))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, Missing> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(missing)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, Missing> {
    let mut store = db.write().await;
    store.todos.remove(&id).map(|_| Json(json!({}))).ok_or_else(missing)
}

/// Reflect method, headers and body. Repeated headers are joined with
/// `", "`. Non-JSON bodies come back as strings, an empty body as `null`.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let mut reflected = Map::new();
    for (name, value) in headers.iter() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        match reflected.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                reflected.insert(name.as_str().to_string(), Value::String(value.to_string()));
            }
        }
    }
    let body = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => Value::String(body),
        }
    };
    Json(json!({ "method": method.as_str(), "headers": reflected, "body": body }))
}

async fn malformed() -> &'static str {
    "this is not json"
}

async fn binary() -> Vec<u8> {
    vec![b'{', 0xff, 0xfe, b'}']
}
