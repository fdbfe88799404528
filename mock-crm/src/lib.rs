//! In-memory CRM server for tests and local runs.
//!
//! Serves the object, association and owner routes under `/crm/v3` behind a
//! bearer check, answering with the CRM's envelopes and error documents.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const OBJECT_TYPES: &[&str] = &["contacts", "companies", "deals", "tickets"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmObject {
    pub id: String,
    pub properties: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
    pub archived: bool,
}

#[derive(Deserialize)]
pub struct ObjectInput {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub properties: Option<String>,
    pub limit: Option<usize>,
    pub after: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Link {
    from_type: String,
    from_id: String,
    to_type: String,
    to_id: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    objects: HashMap<String, BTreeMap<u64, CrmObject>>,
    links: Vec<Link>,
    owners: Vec<Value>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error document in the CRM's wire shape.
pub struct ApiFailure {
    status: StatusCode,
    category: &'static str,
    message: String,
}

impl ApiFailure {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            category: "OBJECT_NOT_FOUND",
            message: message.into(),
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            category: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            category: "INVALID_AUTHENTICATION",
            message: "Authentication credentials not found.".to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "message": self.message,
            "correlationId": Uuid::new_v4(),
            "category": self.category,
        });
        (self.status, Json(body)).into_response()
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn seed_owners() -> Vec<Value> {
    vec![
        json!({
            "id": "101",
            "email": "first.owner@example.com",
            "type": "PERSON",
            "firstName": "First",
            "lastName": "Owner",
            "userId": 9001,
            "userIdIncludingInactive": 9001,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z",
            "archived": false,
            "teams": [{"id": "1", "name": "Sales", "primary": true}]
        }),
        json!({
            "id": "102",
            "email": "queue@example.com",
            "type": "QUEUE",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "archived": false
        }),
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        owners: seed_owners(),
        ..Store::default()
    }));
    Router::new()
        .route("/crm/v3/objects/{object_type}", get(list_objects).post(create_object))
        .route(
            "/crm/v3/objects/{object_type}/{id}",
            get(get_object).patch(update_object).delete(delete_object),
        )
        .route(
            "/crm/v3/objects/{object_type}/{id}/associations/default/{to_type}/{to_id}",
            put(associate_default),
        )
        .route(
            "/crm/v3/objects/{object_type}/{id}/associations/{to_type}",
            get(list_associations),
        )
        .route("/crm/v3/owners", get(list_owners))
        .route("/crm/v3/owners/{id}", get(get_owner))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());
    if !authorized {
        return ApiFailure::unauthorized().into_response();
    }
    next.run(request).await
}

fn check_type(object_type: &str) -> Result<(), ApiFailure> {
    if OBJECT_TYPES.contains(&object_type) {
        Ok(())
    } else {
        Err(ApiFailure::validation(format!("Unable to infer object type from: {object_type}")))
    }
}

fn parse_id(id: &str) -> Result<u64, ApiFailure> {
    id.parse()
        .map_err(|_| ApiFailure::not_found(format!("Object not found. objectId are usually numeric: {id}")))
}

/// Restrict properties to `requested`, reporting requested-but-unset ones as null.
fn project(object: &CrmObject, requested: Option<&str>) -> CrmObject {
    let Some(requested) = requested else {
        return object.clone();
    };
    let properties = requested
        .split(',')
        .filter(|name| !name.is_empty())
        .map(|name| {
            let value = object.properties.get(name).cloned().unwrap_or(Value::Null);
            (name.to_string(), value)
        })
        .collect();
    CrmObject {
        properties,
        ..object.clone()
    }
}

/// Cursor pagination over ascending ids.
fn page<T>(items: Vec<(String, T)>, limit: Option<usize>, after: Option<&str>) -> (Vec<T>, Option<String>) {
    let start = after
        .and_then(|cursor| items.iter().position(|(id, _)| id == cursor))
        .map_or(0, |pos| pos + 1);
    let limit = limit.unwrap_or(100);
    let mut rest = items.into_iter().skip(start);
    let page: Vec<(String, T)> = rest.by_ref().take(limit).collect();
    let next = if rest.next().is_some() {
        page.last().map(|(id, _)| id.clone())
    } else {
        None
    };
    (page.into_iter().map(|(_, item)| item).collect(), next)
}

fn list_body<T: Serialize>(results: Vec<T>, next: Option<String>) -> Value {
    let mut body = json!({ "results": results });
    if let Some(after) = next {
        body["paging"] = json!({ "next": { "after": after, "link": format!("?after={after}") } });
    }
    body
}

async fn list_objects(
    State(db): State<Db>,
    Path(object_type): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiFailure> {
    check_type(&object_type)?;
    let store = db.read().await;
    let items: Vec<(String, CrmObject)> = store
        .objects
        .get(&object_type)
        .map(|objects| {
            objects
                .values()
                .map(|o| (o.id.clone(), project(o, params.properties.as_deref())))
                .collect()
        })
        .unwrap_or_default();
    let (results, next) = page(items, params.limit, params.after.as_deref());
    Ok(Json(list_body(results, next)))
}

async fn create_object(
    State(db): State<Db>,
    Path(object_type): Path<String>,
    Json(input): Json<ObjectInput>,
) -> Result<(StatusCode, Json<CrmObject>), ApiFailure> {
    check_type(&object_type)?;
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let stamp = now();
    let object = CrmObject {
        id: id.to_string(),
        properties: input
            .properties
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .collect(),
        created_at: stamp.clone(),
        updated_at: stamp,
        archived: false,
    };
    store
        .objects
        .entry(object_type.clone())
        .or_default()
        .insert(id, object.clone());
    tracing::debug!(%object_type, id, "created object");
    Ok((StatusCode::CREATED, Json(object)))
}

async fn get_object(
    State(db): State<Db>,
    Path((object_type, id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<CrmObject>, ApiFailure> {
    check_type(&object_type)?;
    let key = parse_id(&id)?;
    let store = db.read().await;
    store
        .objects
        .get(&object_type)
        .and_then(|objects| objects.get(&key))
        .map(|o| Json(project(o, params.properties.as_deref())))
        .ok_or_else(|| ApiFailure::not_found(format!("Object not found: {id}")))
}

/// Omitted keys are left alone, null clears, anything else sets.
async fn update_object(
    State(db): State<Db>,
    Path((object_type, id)): Path<(String, String)>,
    Json(input): Json<ObjectInput>,
) -> Result<Json<CrmObject>, ApiFailure> {
    check_type(&object_type)?;
    let key = parse_id(&id)?;
    let mut store = db.write().await;
    let object = store
        .objects
        .get_mut(&object_type)
        .and_then(|objects| objects.get_mut(&key))
        .ok_or_else(|| ApiFailure::not_found(format!("Object not found: {id}")))?;
    for (name, value) in input.properties {
        if value.is_null() {
            object.properties.remove(&name);
        } else {
            object.properties.insert(name, value);
        }
    }
    object.updated_at = now();
    Ok(Json(object.clone()))
}

async fn delete_object(
    State(db): State<Db>,
    Path((object_type, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiFailure> {
    check_type(&object_type)?;
    let key = parse_id(&id)?;
    let mut store = db.write().await;
    store
        .objects
        .get_mut(&object_type)
        .and_then(|objects| objects.remove(&key))
        .ok_or_else(|| ApiFailure::not_found(format!("Object not found: {id}")))?;
    store
        .links
        .retain(|l| !(l.from_type == object_type && l.from_id == id));
    tracing::debug!(%object_type, %id, "archived object");
    Ok(StatusCode::NO_CONTENT)
}

fn exists(store: &Store, object_type: &str, id: &str) -> bool {
    id.parse::<u64>()
        .ok()
        .and_then(|key| store.objects.get(object_type)?.get(&key))
        .is_some()
}

async fn associate_default(
    State(db): State<Db>,
    Path((object_type, id, to_type, to_id)): Path<(String, String, String, String)>,
) -> Result<Json<Value>, ApiFailure> {
    check_type(&object_type)?;
    check_type(&to_type)?;
    let mut store = db.write().await;
    if !exists(&store, &object_type, &id) {
        return Err(ApiFailure::not_found(format!("Object not found: {id}")));
    }
    if !exists(&store, &to_type, &to_id) {
        return Err(ApiFailure::not_found(format!("Object not found: {to_id}")));
    }
    let link = Link {
        from_type: object_type.clone(),
        from_id: id.clone(),
        to_type: to_type.clone(),
        to_id: to_id.clone(),
    };
    if !store.links.contains(&link) {
        store.links.push(link);
    }

    let key = parse_id(&id)?;
    let object = store
        .objects
        .get(&object_type)
        .and_then(|objects| objects.get(&key))
        .cloned()
        .ok_or_else(|| ApiFailure::not_found(format!("Object not found: {id}")))?;
    let associated: Vec<Value> = store
        .links
        .iter()
        .filter(|l| l.from_type == object_type && l.from_id == id && l.to_type == to_type)
        .map(|l| json!({"id": l.to_id, "type": format!("{}_to_{}", singular(&object_type), singular(&to_type))}))
        .collect();

    let mut associations = Map::new();
    associations.insert(to_type, json!({ "results": associated }));
    let mut body = serde_json::to_value(object).unwrap_or_default();
    body["associations"] = Value::Object(associations);
    Ok(Json(body))
}

fn singular(object_type: &str) -> &str {
    match object_type {
        "companies" => "company",
        other => other.strip_suffix('s').unwrap_or(other),
    }
}

async fn list_associations(
    State(db): State<Db>,
    Path((object_type, id, to_type)): Path<(String, String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiFailure> {
    check_type(&object_type)?;
    let store = db.read().await;
    if !exists(&store, &object_type, &id) {
        return Err(ApiFailure::not_found(format!("Object not found: {id}")));
    }
    let items: Vec<(String, Value)> = store
        .links
        .iter()
        .filter(|l| l.from_type == object_type && l.from_id == id && l.to_type == to_type)
        .map(|l| {
            let to_object_id: u64 = l.to_id.parse().unwrap_or_default();
            let record = json!({
                "toObjectId": to_object_id,
                "associationTypes": [{"category": "HUBSPOT_DEFINED", "typeId": 1, "label": null}]
            });
            (l.to_id.clone(), record)
        })
        .collect();
    let (results, next) = page(items, params.limit, params.after.as_deref());
    Ok(Json(list_body(results, next)))
}

async fn list_owners(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(list_body(store.owners.clone(), None))
}

async fn get_owner(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    store
        .owners
        .iter()
        .find(|o| o["id"] == id.as_str())
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found(format!("Owner not found: {id}")))
}
