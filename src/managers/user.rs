use super::{parse, Outcome};
use crate::error::AppError;
use crate::store::{encode, filter_eq, Collection, EntityStore, Record};
use crate::token::TokenIssuer;
use crate::validation::{self, Payload, CREATE_USER, LOGIN};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Schooladmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Schooladmin => "schooladmin",
        }
    }

    /// Missing or unknown roles fall back to `superadmin`. This grants the widest role by default,
    /// so every fallback is logged.
    pub fn coerce(raw: Option<&Value>) -> Role {
        match raw.and_then(Value::as_str) {
            Some("superadmin") => Role::Superadmin,
            Some("schooladmin") => Role::Schooladmin,
            other => {
                tracing::warn!(requested = ?other, "role missing or invalid, defaulting to superadmin");
                Role::Superadmin
            }
        }
    }
}

/// Stored shape of a user. No password is kept: credential hashing does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDoc {
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    role: Role,
    /// Secret mixed into issued tokens; never leaves this manager.
    key: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    username: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user: UserView,
    pub long_token: String,
}

fn project(record: &Record, doc: &UserDoc) -> UserView {
    UserView {
        id: record.id.clone(),
        username: doc.username.clone(),
        email: doc.email.clone(),
        role: doc.role,
    }
}

#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn EntityStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl UserManager {
    pub fn new(store: Arc<dyn EntityStore>, tokens: Arc<dyn TokenIssuer>) -> Self {
        UserManager { store, tokens }
    }

    /// Role is coerced before validation. A supplied password is validated for shape and dropped.
    pub async fn create_user(&self, payload: &Payload) -> Result<Outcome<UserSession>, AppError> {
        let role = Role::coerce(payload.get("role"));
        let mut payload = payload.clone();
        payload.insert("role".into(), Value::String(role.as_str().into()));

        if let Some(report) = validation::validate(&payload, CREATE_USER) {
            return Ok(Outcome::Invalid(report));
        }
        let new: NewUser = parse(&payload)?;
        let doc = UserDoc {
            username: new.username,
            email: new.email,
            role,
            key: uuid::Uuid::new_v4().simple().to_string(),
        };
        let record = self.store.create(Collection::Users, encode(&doc)?).await?;
        let long_token = self.tokens.long_token(&record.id, &doc.key)?;
        tracing::info!(user_id = %record.id, role = role.as_str(), "user registered");
        Ok(Outcome::Done(UserSession {
            user: project(&record, &doc),
            long_token,
        }))
    }

    /// NOT PRODUCTION READY: the password is required but never checked. Any caller who knows an
    /// email receives a token for that user.
    pub async fn login(&self, payload: &Payload) -> Result<Outcome<UserSession>, AppError> {
        if let Some(report) = validation::validate(payload, LOGIN) {
            return Ok(Outcome::Invalid(report));
        }
        let creds: Credentials = parse(payload)?;
        let record = self
            .store
            .find(Collection::Users, &filter_eq("email", creds.email.as_str()))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::InvalidCredentials)?;
        let doc: UserDoc = record.decode()?;
        tracing::warn!(user_id = %record.id, "login without password verification");
        let long_token = self.tokens.long_token(&record.id, &doc.key)?;
        Ok(Outcome::Done(UserSession {
            user: project(&record, &doc),
            long_token,
        }))
    }
}
