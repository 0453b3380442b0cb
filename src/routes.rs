//! Router construction, shared by the binary and the HTTP tests.

use axum::{
  extract::DefaultBodyLimit,
  http::StatusCode,
  routing::{get, post, put},
  Router,
};
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth;
use crate::handlers;
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
  Router::new()
    // Accounts
    .route("/user/register", post(auth::register))
    .route("/user/login", post(auth::login))
    .route("/user/logout", post(auth::logout))
    .route("/user/me", get(auth::me))
    .route("/user/update", put(auth::update_profile))
    .route("/user/dashboard", get(handlers::dashboard))
    .route("/user/completed", get(handlers::completed_courses))
    .route("/user/progress", get(handlers::get_progress).post(handlers::mark_complete))
    // Catalog
    .route("/course/all", get(handlers::list_courses))
    .route("/course/new", post(handlers::create_course))
    .route(
      "/course/{id}",
      get(handlers::get_course)
        .post(handlers::add_lecture)
        .put(handlers::update_course)
        .delete(handlers::delete_course),
    )
    .route("/lectures/{course_id}", get(handlers::list_lectures))
    .route("/lecture/all", get(handlers::all_lectures))
    .route(
      "/lecture/{id}",
      get(handlers::get_lecture)
        .put(handlers::update_lecture)
        .delete(handlers::delete_lecture),
    )
    .route("/mycourse", get(handlers::my_courses))
    // Enrollment
    .route("/course/checkout/{id}", post(handlers::checkout))
    .route("/verification/{id}", post(handlers::verify_payment))
    .route("/course/enroll/{id}", post(handlers::enroll_free))
    .route("/certificate/{course_id}", get(handlers::certificate))
    // Quizzes
    .route("/quiz/{lecture_id}", get(handlers::get_quiz))
    .route("/quiz/submit/{lecture_id}", post(handlers::submit_quiz))
    .route("/quiz/create/{lecture_id}", post(handlers::create_quiz))
    .route("/quiz/update/{lecture_id}", put(handlers::update_quiz))
    .route("/quiz/delete/{lecture_id}", axum::routing::delete(handlers::clear_quiz))
    .route("/admin/quiz-results/{lecture_id}", get(handlers::quiz_results))
    // Administration
    .route("/stats", get(handlers::stats))
    .route("/users", get(handlers::list_users))
    .route("/user/{id}/role", put(handlers::update_role))
    .route("/ask-ai", post(handlers::ask))
}

pub fn build_router(state: AppState) -> Router {
  let uploads = ServeDir::new(&state.config.uploads_dir);
  let body_limit = state.config.max_upload_bytes;
  let timeout = state.config.request_timeout;

  Router::new()
    .nest("/api", api_routes())
    .nest_service("/uploads", uploads)
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
