use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tutorhub_api::database::manager::DatabaseManager;
use tutorhub_api::docs::ApiDoc;
use tutorhub_api::handlers::{
    admin, auth, catalog, courses, orders, reservations, reviews, teachers, users,
};
use tutorhub_api::config;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting TutorHub API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("TUTORHUB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("TutorHub API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(catalog_routes())
        .merge(teacher_routes())
        .merge(course_routes())
        .merge(order_routes())
        .merge(reservation_routes())
        .merge(review_routes())
        .merge(admin_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
}

fn user_routes() -> Router {
    Router::new().route(
        "/api/users/me",
        patch(users::update_me).delete(users::delete_me),
    )
}

fn catalog_routes() -> Router {
    Router::new()
        .route("/api/catalog/cities", get(catalog::cities))
        .route("/api/catalog/categories", get(catalog::categories))
}

fn teacher_routes() -> Router {
    Router::new()
        .route("/api/teachers", post(teachers::apply))
        .route(
            "/api/teachers/me",
            get(teachers::me).patch(teachers::update_me),
        )
        .route(
            "/api/teachers/me/slots",
            get(teachers::my_slots).post(teachers::add_slot),
        )
        .route("/api/teachers/me/slots/:id", delete(teachers::remove_slot))
        .route("/api/teachers/:id", get(teachers::public_profile))
        .route("/api/teachers/:id/slots", get(teachers::public_slots))
}

fn course_routes() -> Router {
    Router::new()
        .route("/api/courses", get(courses::search).post(courses::create))
        .route(
            "/api/courses/:id",
            get(courses::detail)
                .patch(courses::update)
                .delete(courses::deactivate),
        )
        .route(
            "/api/courses/:id/price-options",
            post(courses::add_price_option),
        )
        .route(
            "/api/courses/:id/price-options/:option_id",
            put(courses::replace_price_option).delete(courses::remove_price_option),
        )
        .route("/api/courses/:id/reviews", get(courses::reviews))
}

fn order_routes() -> Router {
    Router::new()
        .route("/api/orders", post(orders::create).get(orders::list))
        .route("/api/orders/:id", get(orders::detail))
        .route("/api/orders/:id/pay", post(orders::pay))
        .route("/api/orders/:id/cancel", post(orders::cancel))
        .route("/api/purchases", get(orders::purchases))
}

fn reservation_routes() -> Router {
    Router::new()
        .route(
            "/api/reservations",
            post(reservations::create).get(reservations::list),
        )
        .route("/api/reservations/:id", get(reservations::detail))
        .route("/api/reservations/:id/confirm", post(reservations::confirm))
        .route(
            "/api/reservations/:id/complete",
            post(reservations::complete),
        )
        .route("/api/reservations/:id/cancel", post(reservations::cancel))
}

fn review_routes() -> Router {
    Router::new()
        .route("/api/reviews", post(reviews::create))
        .route(
            "/api/reviews/:id",
            patch(reviews::update).delete(reviews::delete),
        )
}

fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/teachers", get(admin::list_teachers))
        .route(
            "/api/admin/teachers/:id/approve",
            post(admin::approve_teacher),
        )
        .route(
            "/api/admin/teachers/:id/reject",
            post(admin::reject_teacher),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id/activate", post(admin::activate_user))
        .route(
            "/api/admin/users/:id/deactivate",
            post(admin::deactivate_user),
        )
        .route("/api/admin/courses", get(admin::list_courses))
        .route(
            "/api/admin/courses/:id/activate",
            post(admin::activate_course),
        )
        .route(
            "/api/admin/courses/:id/deactivate",
            post(admin::deactivate_course),
        )
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/reviews/:id/hide", post(admin::hide_review))
        .route("/api/admin/reviews/:id/unhide", post(admin::unhide_review))
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().security.cors_origins;

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "TutorHub API",
            "version": version,
            "description": "Marketplace backend for booking tutoring sessions",
            "endpoints": {
                "home": "/ (public)",
                "docs": "/docs (public, Swagger UI)",
                "auth": "/api/auth/* (signup and login public, /api/auth/me protected)",
                "catalog": "/api/catalog/* (public)",
                "teachers": "/api/teachers/* (public cards, protected management)",
                "courses": "/api/courses/* (public search, protected management)",
                "orders": "/api/orders, /api/purchases (protected)",
                "reservations": "/api/reservations/* (protected)",
                "reviews": "/api/reviews/* (protected)",
                "admin": "/api/admin/* (admin tokens only)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
