use crate::{
    routes::students::{
        create_student, delete_student, get_student, list_students, patch_student,
        replace_student, unknown_route,
    },
    state::RosterState,
};
use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod students;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student)
                .put(replace_student)
                .patch(patch_student)
                .delete(delete_student),
        )
        .fallback(unknown_route)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
