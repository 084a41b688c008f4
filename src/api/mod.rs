use axum::Json;
use axum::extract::Path;
use axum::response::Html;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::{AppError, ValidationError};
use crate::hierarchy::prepare_for_save;
use crate::models::*;
use crate::render::LessonRenderer;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ModulesResponse {
    modules: Vec<Module>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/{id}", get(get_course))
        .route("/api/modules", post(create_module))
        .route("/api/modules/course/{course_id}", get(list_published_modules))
        .route("/api/modules/course/{course_id}/admin", get(list_all_modules))
        .route("/api/modules/{id}", put(update_module).delete(delete_module))
        .route(
            "/course/{course_id}/modules/{module_id}/{sub_module_id}",
            get(lesson_page),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = repository::find_course(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    validate_course(&req)?;
    let course = repository::insert_course(&state.db, req)
        .await
        .map_err(|e| conflict_on_duplicate(e, "a course with this id already exists"))?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn list_published_modules(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<ModulesResponse>, AppError> {
    let modules = repository::fetch_modules(&state.db, &course_id, true).await?;
    debug!(course = %course_id, count = modules.len(), "listed published modules");
    Ok(Json(ModulesResponse { modules }))
}

async fn list_all_modules(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<ModulesResponse>, AppError> {
    let modules = repository::fetch_modules(&state.db, &course_id, false).await?;
    Ok(Json(ModulesResponse { modules }))
}

async fn create_module(
    State(state): State<AppState>,
    Json(module): Json<Module>,
) -> Result<(StatusCode, Json<Module>), AppError> {
    let prepared = prepare_for_save(&module)?;
    let saved = repository::insert_module(&state.db, prepared)
        .await
        .map_err(|e| conflict_on_duplicate(e, "a module with this id already exists in the course"))?;
    info!(course = %saved.course_id, module = %saved.id, "created module");
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(module): Json<Module>,
) -> Result<Json<Module>, AppError> {
    let prepared = prepare_for_save(&module)?;
    let saved = repository::update_module(&state.db, &id, prepared)
        .await
        .map_err(|e| conflict_on_duplicate(e, "a module with this id already exists in the course"))?
        .ok_or(AppError::NotFound)?;
    info!(course = %saved.course_id, module = %saved.id, "updated module");
    Ok(Json(saved))
}

async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ok = repository::delete_module(&state.db, &id).await?;
    if ok {
        info!(object_id = %id, "deleted module");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn lesson_page(
    State(state): State<AppState>,
    Path((course_id, module_id, sub_module_id)): Path<(String, String, String)>,
) -> Result<Html<String>, AppError> {
    let modules = repository::fetch_modules(&state.db, &course_id, true).await?;
    let lesson = LessonRenderer::new()
        .render_lesson(&course_id, &modules, &module_id, &sub_module_id)
        .ok_or(AppError::NotFound)?;
    Ok(Html(lesson.to_html()))
}

fn validate_course(req: &NewCourseRequest) -> Result<(), ValidationError> {
    let mut err = ValidationError::new("Course id and title are required");
    if req.id.trim().is_empty() {
        err = err.with_field("id", "Course id is required");
    }
    if req.title.trim().is_empty() {
        err = err.with_field("title", "Course title is required");
    }
    if err.fields.is_empty() {
        Ok(())
    } else {
        Err(err)
    }
}

fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::Database(err)
}
