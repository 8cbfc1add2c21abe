//! Route dispatcher.
//!
//! Registers one axum route per [`Route`]: GET either renders the empty form or executes the
//! parameterless statement, POST binds the submitted form values positionally and executes.
//! Store errors are rendered into the page; only a broken template answers with a 500.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Form, Router,
};
use hastane_core::form::params_from_fields;
use hastane_core::{
    GetBehaviour, Param, QueryError, Route, Rows, StatementExecutor, LAYOUT_VIEW,
};
use tower_http::trace::TraceLayer;

use crate::health::{HealthRes, HealthService};
use crate::views::{ViewContext, ViewRegistry};

/// Application state shared across handlers.
///
/// The executor owns the connection pool; the view registry is immutable after startup.
pub struct AppState<E> {
    pub executor: Arc<E>,
    pub views: Arc<ViewRegistry>,
}

impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            views: self.views.clone(),
        }
    }
}

impl<E: StatementExecutor> AppState<E> {
    pub fn new(executor: E, views: ViewRegistry) -> Self {
        Self {
            executor: Arc::new(executor),
            views: Arc::new(views),
        }
    }
}

/// Every view the dispatcher renders: the layout plus one per route.
pub fn required_views() -> Vec<String> {
    std::iter::once(LAYOUT_VIEW.to_string())
        .chain(Route::all().into_iter().map(Route::view))
        .collect()
}

/// Build the HTTP router over every route in the route table.
pub fn build_router<E: StatementExecutor>(state: AppState<E>) -> Router {
    let mut router = Router::new()
        .route("/", get(index::<E>))
        .route("/health", get(health));

    for route in Route::all() {
        let mut method_router =
            get(move |State(state): State<AppState<E>>| async move { show(state, route).await });

        if route.accepts_post() {
            method_router = method_router.post(
                move |State(state): State<AppState<E>>,
                      form: Result<Form<Vec<(String, String)>>, FormRejection>| async move {
                    submit(state, route, form_fields(route, form)).await
                },
            );
        }

        router = router.route(&route.path(), method_router);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Submitted fields in order; an unreadable body submits nothing and the store decides.
fn form_fields(
    route: Route,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Vec<(String, String)> {
    match form {
        Ok(Form(fields)) => fields,
        Err(e) => {
            tracing::debug!("{} body not read as a form: {}", route, e);
            Vec::new()
        }
    }
}

async fn index<E: StatementExecutor>(State(state): State<AppState<E>>) -> Response {
    render(&state.views, LAYOUT_VIEW, None)
}

/// Liveness check.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

async fn show<E: StatementExecutor>(state: AppState<E>, route: Route) -> Response {
    match route.get_behaviour() {
        GetBehaviour::ShowForm => render(&state.views, &route.view(), None),
        GetBehaviour::Execute => {
            let ctx = ViewContext::from(run(&state, route, Vec::new()).await);
            render(&state.views, &route.view(), Some(&ctx))
        }
    }
}

async fn submit<E: StatementExecutor>(
    state: AppState<E>,
    route: Route,
    fields: Vec<(String, String)>,
) -> Response {
    let params = params_from_fields(fields);
    let ctx = ViewContext::from(run(&state, route, params).await);
    render(&state.views, &route.view(), Some(&ctx))
}

async fn run<E: StatementExecutor>(
    state: &AppState<E>,
    route: Route,
    params: Vec<Param>,
) -> Result<Rows, QueryError> {
    let arity = route.statement().arity;
    if params.len() != arity {
        tracing::warn!(
            "{} expects {} parameters, got {}; forwarding as submitted",
            route,
            arity,
            params.len()
        );
    }

    let outcome = state.executor.execute(route, params).await;
    if let Err(e) = &outcome {
        tracing::error!("{} failed: {:?}", route, e);
    }
    outcome
}

fn render(views: &ViewRegistry, name: &str, ctx: Option<&ViewContext>) -> Response {
    match views.render(name, ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Render view error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
