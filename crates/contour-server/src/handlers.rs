//! HTTP request handlers for the server.
//!
//! REST routes are generated from the active revision's projections: every
//! entity gets the same five handlers under `/api/{collection}`. GraphQL is
//! mounted at `/graphql` and a health check at `/health`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use contour_domain::{access, ContractError, EntityProjection, Revision, ValidationError};
use contour_graphql::GraphQLSchema;
use contour_store::SharedStore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Store shared with the GraphQL and gRPC adapters
    pub store: SharedStore,
    /// Revision whose projections drive the routes
    pub revision: Revision,
    /// GraphQL schema of the same revision
    pub graphql: GraphQLSchema,
}

impl AppState {
    /// Build the state for `revision` around an open store
    pub fn new(revision: Revision, store: SharedStore) -> Self {
        let graphql = GraphQLSchema::build(revision, store.clone());
        Self {
            store,
            revision,
            graphql,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Active revision
    pub revision: Revision,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Domain failure from the projection layer or store
    Contract(ContractError),
    /// Body or path could not be extracted
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Contract(e @ ContractError::Validation(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Contract(e @ ContractError::NotFound { .. }) => (StatusCode::NOT_FOUND, e.to_string()),
            AppError::Contract(e @ ContractError::Storage(_)) => {
                tracing::error!("{}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ContractError> for AppError {
    fn from(e: ContractError) -> Self {
        AppError::Contract(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let raw = rejection.body_text();
        AppError::Contract(ValidationError::InvalidId(raw).into())
    }
}

type PathId = Result<Path<i64>, PathRejection>;
type Body = Result<Json<Value>, JsonRejection>;

/// GET /api/{collection}
async fn list_entities(
    state: AppState,
    projection: &'static EntityProjection,
) -> Result<Json<Vec<Value>>, AppError> {
    let store = access::lock(&state.store)?;
    Ok(Json(access::fetch_all(&*store, projection)?))
}

/// GET /api/{collection}/:id
async fn get_entity(
    state: AppState,
    projection: &'static EntityProjection,
    id: PathId,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let store = access::lock(&state.store)?;
    Ok(Json(access::fetch(&*store, projection, id)?))
}

/// POST /api/{collection}
async fn create_entity(
    state: AppState,
    projection: &'static EntityProjection,
    body: Body,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(body) = body?;
    let mut store = access::lock(&state.store)?;
    let id = access::create(&mut *store, projection, &body)?;

    tracing::info!(id, "{} created", projection.entity);
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// PUT /api/{collection}/:id
async fn update_entity(
    state: AppState,
    projection: &'static EntityProjection,
    id: PathId,
    body: Body,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let mut store = access::lock(&state.store)?;
    access::replace(&mut *store, projection, id, &body)?;
    Ok(Json(access::fetch(&*store, projection, id)?))
}

/// DELETE /api/{collection}/:id
async fn delete_entity(
    state: AppState,
    projection: &'static EntityProjection,
    id: PathId,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let mut store = access::lock(&state.store)?;

    if !access::remove(&mut *store, projection, id)? {
        return Err(ContractError::NotFound {
            entity: projection.entity,
            id,
        }
        .into());
    }

    tracing::info!(id, "{} deleted", projection.entity);
    Ok(Json(json!({ "id": id, "deleted": true })))
}

/// Routes for one entity
fn entity_routes(projection: &'static EntityProjection) -> Router<AppState> {
    let collection = format!("/api/{}", projection.collection);
    let item = format!("{}/:id", collection);

    Router::new()
        .route(
            &collection,
            get(move |State(state): State<AppState>| list_entities(state, projection)).post(
                move |State(state): State<AppState>, body: Body| create_entity(state, projection, body),
            ),
        )
        .route(
            &item,
            get(move |State(state): State<AppState>, id: PathId| get_entity(state, projection, id))
                .put(move |State(state): State<AppState>, id: PathId, body: Body| {
                    update_entity(state, projection, id, body)
                })
                .delete(move |State(state): State<AppState>, id: PathId| {
                    delete_entity(state, projection, id)
                }),
        )
}

/// POST /graphql
async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.graphql.execute(request).await)
}

/// GET /graphql/sdl
async fn graphql_sdl(State(state): State<AppState>) -> String {
    state.graphql.sdl()
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        revision: state.revision,
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = state
        .revision
        .projections()
        .into_iter()
        .fold(Router::new(), |router, projection| router.merge(entity_routes(projection)));

    api.route("/graphql", post(graphql_handler))
        .route("/graphql/sdl", get(graphql_sdl))
        .route("/health", get(health_check))
        .with_state(state)
}

/// CORS policy allowing credentials from the listed origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, String> {
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin).map_err(|_| origin.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
