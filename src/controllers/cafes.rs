use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    error::AppError,
    forms::{CafeForm, FieldErrors},
    middleware::CsrfSession,
    models::{Cafe, StoreError},
    views, AppState,
};

pub const DUPLICATE_NAME_MESSAGE: &str = "A cafe with this name already exists.";

pub fn routes(legacy_get_delete: bool) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/", get(home))
        .route("/all", get(get_all))
        .route("/add", get(new_cafe_form).post(add_cafe));

    if legacy_get_delete {
        router.route("/delete/{id}", get(delete_cafe_by_link).post(delete_cafe))
    } else {
        router.route("/delete/{id}", post(delete_cafe))
    }
}

/* ---------- READ ---------- */

// GET /
async fn home(
    State(state): State<Arc<AppState>>,
    session: CsrfSession,
) -> Result<Response, AppError> {
    let cafes = Cafe::list_all(&state.db).await?;
    let page = views::index(&cafes, &state.csrf.issue(session.id()));
    Ok(session.attach(page))
}

// GET /all
async fn get_all(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let cafes = Cafe::list_all(&state.db).await?;
    let cafe: Vec<Value> = cafes
        .iter()
        .map(|c| Value::Object(c.to_public_dict()))
        .collect();

    Ok(Json(json!({ "cafe": cafe })))
}

/* ---------- ADD ---------- */

// GET /add
async fn new_cafe_form(State(state): State<Arc<AppState>>, session: CsrfSession) -> Response {
    let page = views::add_form(
        &CafeForm::default(),
        &FieldErrors::new(),
        &state.csrf.issue(session.id()),
        None,
    );
    session.attach(page)
}

fn rerender(
    state: &AppState,
    session: &CsrfSession,
    status: StatusCode,
    form: &CafeForm,
    errors: &FieldErrors,
    banner: Option<&str>,
) -> Response {
    let page: Html<String> = views::add_form(form, errors, &state.csrf.issue(session.id()), banner);
    session.attach((status, page))
}

// POST /add
async fn add_cafe(
    State(state): State<Arc<AppState>>,
    session: CsrfSession,
    form: Result<Form<CafeForm>, FormRejection>,
) -> Response {
    // тело не form-urlencoded: дальше отработает как пустая форма без токена
    let form = form.map(|Form(form)| form).unwrap_or_default();

    if let Err(e) = state.csrf.verify(&form.csrf_token, session.existing()) {
        debug!("add_cafe rejected: {}", e);
        let banner = e.to_string();
        return rerender(&state, &session, StatusCode::BAD_REQUEST, &form, &FieldErrors::new(), Some(&banner));
    }

    let new = match form.to_new_cafe() {
        Ok(new) => new,
        Err(errors) => {
            debug!(fields = ?errors.keys().collect::<Vec<_>>(), "add_cafe validation failed");
            return rerender(&state, &session, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors, None);
        }
    };

    match Cafe::insert(&new, &state.db).await {
        Ok(cafe) => {
            info!(id = cafe.id, name = %cafe.name, "Cafe added");
            Redirect::to("/").into_response()
        }
        Err(StoreError::DuplicateName(name)) => {
            info!(name = %name, "Duplicate cafe name rejected");
            let mut errors = FieldErrors::new();
            errors.insert("name".to_string(), DUPLICATE_NAME_MESSAGE.to_string());
            rerender(&state, &session, StatusCode::CONFLICT, &form, &errors, None)
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/* ---------- DELETE ---------- */

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteForm {
    csrf_token: String,
}

fn cafe_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::NotFound("Cafe not found".to_string()))
}

async fn remove(state: &AppState, id: i64) -> Result<Redirect, AppError> {
    Cafe::delete_by_id(id, &state.db).await?;
    info!(id, "Cafe deleted");
    Ok(Redirect::to("/"))
}

// POST /delete/{id}
async fn delete_cafe(
    State(state): State<Arc<AppState>>,
    session: CsrfSession,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let id = cafe_id(path)?;
    let form = form.map(|Form(form)| form).unwrap_or_default();
    state.csrf.verify(&form.csrf_token, session.existing())?;
    remove(&state, id).await
}

// GET /delete/{id} - старые ссылки, без CSRF
async fn delete_cafe_by_link(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Redirect, AppError> {
    remove(&state, cafe_id(path)?).await
}
