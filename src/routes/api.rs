//! `/api` routes: fixed REST routes per resource, then the generic dispatch route.
//! Static segments take priority over `/:moduleName/:fnName`, so `/api/schools/:id` never reaches the gateway.
//! A fixed path hit with an unserved method answers 405 through the envelope.

use crate::handlers::dispatch::method_not_allowed;
use crate::handlers::{auth, classrooms, dispatch, schools, students};
use crate::state::AppState;
use axum::{
    routing::{any, get, post, put},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register).fallback(method_not_allowed))
        .route("/api/auth/login", post(auth::login).fallback(method_not_allowed))
        .route(
            "/api/schools",
            post(schools::create).get(schools::list).fallback(method_not_allowed),
        )
        .route(
            "/api/schools/:id",
            get(schools::read)
                .put(schools::update)
                .delete(schools::delete)
                .fallback(method_not_allowed),
        )
        .route("/api/classrooms", post(classrooms::create).fallback(method_not_allowed))
        .route(
            "/api/classrooms/school/:id",
            get(classrooms::list_by_school).fallback(method_not_allowed),
        )
        .route(
            "/api/classrooms/:id",
            put(classrooms::update).delete(classrooms::delete).fallback(method_not_allowed),
        )
        .route("/api/students", post(students::create).fallback(method_not_allowed))
        .route(
            "/api/students/classroom/:classroomId",
            get(students::list_by_classroom).fallback(method_not_allowed),
        )
        .route(
            "/api/students/:id",
            put(students::update).delete(students::delete).fallback(method_not_allowed),
        )
        .route("/api/:moduleName/:fnName", any(dispatch::dispatch))
        .with_state(state)
}
