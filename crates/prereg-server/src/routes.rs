//! axum handlers for the signup, contact, post and admin endpoints.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use prereg_core::validation;

use crate::response::{ApiError, Success};
use crate::storage::{
    AdminData, ContactMessage, NewContactMessage, NewPost, NewRegistration, Post, RecordStore,
    Registration,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
}

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const POST_FIELDS_REQUIRED: &str = "mediaHash, body, and title are required";
const INVALID_EMAIL: &str = "Invalid email address";

/// Read a text field, accepting numbers and booleans as their string form.
///
/// `null` reads as absent; arrays and objects are rejected.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "invalid type: expected a string, got {other}"
        ))),
    }
}

/// Body of `POST /pre-register`.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
}

impl RegistrationForm {
    fn validate(&self) -> Result<NewRegistration<'_>, ApiError> {
        let (email, name, username) = (
            self.email.as_deref(),
            self.name.as_deref(),
            self.username.as_deref(),
        );
        let missing =
            validation::missing_fields(&[("email", email), ("name", name), ("username", username)]);
        if !missing.is_empty() {
            return Err(ApiError::validation(ALL_FIELDS_REQUIRED, &missing));
        }

        let email = email.unwrap_or_default();
        if !validation::is_valid_email(email) {
            return Err(ApiError::validation(INVALID_EMAIL, &["email"]));
        }

        Ok(NewRegistration {
            email,
            name: name.unwrap_or_default(),
            username: username.unwrap_or_default(),
        })
    }
}

/// Body of `POST /contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl ContactForm {
    fn validate(&self) -> Result<NewContactMessage<'_>, ApiError> {
        let (name, email, message) = (
            self.name.as_deref(),
            self.email.as_deref(),
            self.message.as_deref(),
        );
        let missing =
            validation::missing_fields(&[("name", name), ("email", email), ("message", message)]);
        if !missing.is_empty() {
            return Err(ApiError::validation(ALL_FIELDS_REQUIRED, &missing));
        }

        let email = email.unwrap_or_default();
        if !validation::is_valid_email(email) {
            return Err(ApiError::validation(INVALID_EMAIL, &["email"]));
        }

        Ok(NewContactMessage {
            name: name.unwrap_or_default(),
            email,
            message: message.unwrap_or_default(),
        })
    }
}

/// Body of `POST /posts`. `links` may be omitted or null.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub media_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    pub links: Option<Vec<String>>,
}

impl PostForm {
    fn validate(&self) -> Result<NewPost<'_>, ApiError> {
        let (media_hash, body, title) = (
            self.media_hash.as_deref(),
            self.body.as_deref(),
            self.title.as_deref(),
        );
        let missing = validation::missing_fields(&[
            ("mediaHash", media_hash),
            ("body", body),
            ("title", title),
        ]);
        if !missing.is_empty() {
            return Err(ApiError::validation(POST_FIELDS_REQUIRED, &missing));
        }

        Ok(NewPost {
            media_hash: media_hash.unwrap_or_default(),
            body: body.unwrap_or_default(),
            title: title.unwrap_or_default(),
            links: self.links.as_deref().unwrap_or_default(),
        })
    }
}

/// Unwrap a JSON body.
///
/// A request without a JSON content type reads as an empty form, so its
/// fields fail validation. Any other rejection is an unhandled error.
fn parse_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::Unhandled(rejection.body_text())),
    }
}

/// `POST /pre-register`
#[instrument(skip_all, fields(route = "/pre-register"))]
pub async fn create_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<Success<Registration>, ApiError> {
    let form = parse_body(payload)?;
    let new = form.validate()?;

    let registration = state
        .store
        .insert_registration(new)
        .await
        .map_err(|e| ApiError::from_store("Error saving registration", e))?;

    info!(
        id = %registration.id,
        email = %registration.email,
        username = %registration.username,
        "Registration saved"
    );
    Ok(Success::created(
        "Registration saved successfully",
        registration,
    ))
}

/// `POST /contact`
#[instrument(skip_all, fields(route = "/contact"))]
pub async fn create_contact_message(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Success<ContactMessage>, ApiError> {
    let form = parse_body(payload)?;
    let new = form.validate()?;

    let message = state
        .store
        .insert_contact_message(new)
        .await
        .map_err(|e| ApiError::from_store("Error saving message", e))?;

    info!(id = %message.id, email = %message.email, "Contact message saved");
    Ok(Success::created("Message sent successfully", message))
}

/// `POST /posts`
#[instrument(skip_all, fields(route = "/posts"))]
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<PostForm>, JsonRejection>,
) -> Result<Success<Post>, ApiError> {
    let form = parse_body(payload)?;
    let new = form.validate()?;

    let post = state
        .store
        .insert_post(new)
        .await
        .map_err(|e| ApiError::from_store("Error creating post", e))?;

    info!(id = %post.id, links = post.links.len(), "Post created");
    Ok(Success::created("Post created successfully", post))
}

/// `GET /posts`
#[instrument(skip_all, fields(route = "/posts"))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Success<Vec<Post>>, ApiError> {
    let posts = state
        .store
        .list_posts()
        .await
        .map_err(|e| ApiError::storage("Error retrieving posts", e))?;

    Ok(Success::ok("Posts retrieved successfully", posts))
}

/// `GET /admin/data` -- every registration and contact message.
///
/// No access control: anyone who can reach the endpoint reads everything.
#[instrument(skip_all, fields(route = "/admin/data"))]
pub async fn admin_data(State(state): State<AppState>) -> Result<Success<AdminData>, ApiError> {
    let data = state
        .store
        .admin_data()
        .await
        .map_err(|e| ApiError::storage("Error retrieving admin data", e))?;

    info!(
        registrations = data.registrations.len(),
        contact_messages = data.contact_messages.len(),
        "Admin data retrieved"
    );
    Ok(Success::ok("Admin data retrieved successfully", data))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Success<()>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::storage("Store unavailable", e))?;

    Ok(Success::ok("ok", ()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[allow(clippy::needless_pass_by_value)] // signature required by CatchPanicLayer
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());
    ApiError::Unhandled(detail).into_response()
}

/// Assemble the service router with permissive CORS, request tracing and a
/// panic boundary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/pre-register", post(create_registration))
        .route("/contact", post(create_contact_message))
        .route("/posts", get(list_posts).post(create_post))
        .route("/admin/data", get(admin_data))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
