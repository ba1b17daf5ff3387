//! Dynamic dispatch for `ANY /api/:moduleName/:fnName`.
//!
//! Every reachable `(module, function)` pair is registered at startup as a typed endpoint. The set of
//! registered functions per module is that module's allowlist: a name that was not registered is
//! rejected before anything runs, whatever the manager itself may implement.

use crate::error::{AppError, ConfigError};
use crate::managers::Managers;
use crate::response::Envelope;
use crate::validation::Payload;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type Endpoint = Arc<dyn Fn(Payload) -> BoxFuture<Result<Envelope, AppError>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Gateway {
    modules: HashMap<String, HashMap<String, Endpoint>>,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Registry for the generic route. Only user registration is reachable; every other entity
    /// operation is served by its fixed REST route.
    pub fn standard(managers: Arc<Managers>) -> Result<Self, ConfigError> {
        Gateway::builder()
            .module("user", managers.user.clone(), |m| {
                m.expose("createUser", |user, payload| async move {
                    user.create_user(&payload).await?.into_envelope(StatusCode::CREATED)
                })
            })
            .map(GatewayBuilder::build)
    }

    /// Resolve and invoke. Unknown module is `UnknownModule`; a function outside the module's
    /// allowlist is `Forbidden` and is never invoked.
    pub async fn dispatch(&self, module: &str, function: &str, payload: Payload) -> Result<Envelope, AppError> {
        let exposed = self
            .modules
            .get(module)
            .ok_or_else(|| AppError::UnknownModule(module.to_string()))?;
        let endpoint = exposed.get(function).ok_or_else(|| {
            tracing::warn!(module = %module, function = %function, "rejected call to unexposed function");
            AppError::Forbidden {
                module: module.to_string(),
                function: function.to_string(),
            }
        })?;
        tracing::debug!(module = %module, function = %function, "dispatch");
        endpoint(payload).await
    }

    pub fn is_exposed(&self, module: &str, function: &str) -> bool {
        self.modules
            .get(module)
            .map(|m| m.contains_key(function))
            .unwrap_or(false)
    }
}

#[derive(Default)]
pub struct GatewayBuilder {
    modules: HashMap<String, HashMap<String, Endpoint>>,
}

impl GatewayBuilder {
    /// Register a module backed by `manager`; `expose` inside `register` lists its callable functions.
    pub fn module<M, F>(mut self, name: &str, manager: M, register: F) -> Result<Self, ConfigError>
    where
        M: Clone + Send + Sync + 'static,
        F: FnOnce(ModuleBuilder<M>) -> Result<ModuleBuilder<M>, ConfigError>,
    {
        if self.modules.contains_key(name) {
            return Err(ConfigError::DuplicateRegistration(name.to_string()));
        }
        let module = register(ModuleBuilder {
            module: name.to_string(),
            manager,
            endpoints: HashMap::new(),
        })?;
        self.modules.insert(name.to_string(), module.endpoints);
        Ok(self)
    }

    pub fn build(self) -> Gateway {
        Gateway { modules: self.modules }
    }
}

pub struct ModuleBuilder<M> {
    module: String,
    manager: M,
    endpoints: HashMap<String, Endpoint>,
}

impl<M> ModuleBuilder<M>
where
    M: Clone + Send + Sync + 'static,
{
    pub fn expose<H, Fut>(mut self, function: &str, handler: H) -> Result<Self, ConfigError>
    where
        H: Fn(M, Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Envelope, AppError>> + Send + 'static,
    {
        if self.endpoints.contains_key(function) {
            return Err(ConfigError::DuplicateRegistration(format!("{}.{}", self.module, function)));
        }
        let manager = self.manager.clone();
        let endpoint: Endpoint = Arc::new(move |payload: Payload| -> BoxFuture<Result<Envelope, AppError>> {
            Box::pin(handler(manager.clone(), payload))
        });
        self.endpoints.insert(function.to_string(), endpoint);
        Ok(self)
    }
}
