//! Per-entity capability trait and the factory that binds it to an instance.
//!
//! [`EntityApi`] is the one interface every call site uses. [`HttpFactory`] resolves
//! the application kind once, rejects kinds that do not manage the requested entity,
//! and hands back a [`RestEndpoint`] speaking that application's API version.

use crate::error::{StarrError, StarrResult};
use crate::models::{AppConfig, Entity};
use crate::starrs::transport::Transport;
use async_trait::async_trait;
use std::marker::PhantomData;

/// Remote operations for one entity kind on one instance.
#[async_trait]
pub trait EntityApi<T: Entity>: Send + Sync {
    async fn list(&self) -> StarrResult<Vec<T>>;

    async fn get(&self, id: i64) -> StarrResult<T>;

    async fn add(&self, entity: &T) -> StarrResult<T>;

    /// `force` is forwarded untouched; the remote decides what it overrides.
    async fn update(&self, entity: &T, force: bool) -> StarrResult<T>;

    async fn delete(&self, id: i64) -> StarrResult<()>;

    async fn test(&self, entity: &T) -> StarrResult<()>;
}

/// Builds [`EntityApi`] handles for configured instances.
pub trait ApiFactory: Send + Sync {
    fn connect<T: Entity>(&self, config: &AppConfig) -> StarrResult<Box<dyn EntityApi<T>>>;
}

/// Factory producing HTTP-backed endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFactory;

impl ApiFactory for HttpFactory {
    fn connect<T: Entity>(&self, config: &AppConfig) -> StarrResult<Box<dyn EntityApi<T>>> {
        let kind = config.kind()?;
        if !kind.supports(T::KIND) {
            return Err(StarrError::UnsupportedApp(config.app.clone()));
        }

        let transport = Transport::new(config, kind)?;
        Ok(Box::new(RestEndpoint::<T>::new(transport, config.app.clone())))
    }
}

/// REST resource `/api/<version>/<resource>` for entity type `T`.
pub struct RestEndpoint<T> {
    transport: Transport,
    app: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RestEndpoint<T> {
    pub fn new(transport: Transport, app: impl Into<String>) -> Self {
        Self {
            transport,
            app: app.into(),
            _entity: PhantomData,
        }
    }

    fn resource(&self) -> &'static str {
        T::KIND.resource()
    }

    fn item(&self, id: i64) -> String {
        format!("{}/{}", self.resource(), id)
    }
}

#[async_trait]
impl<T: Entity> EntityApi<T> for RestEndpoint<T> {
    async fn list(&self) -> StarrResult<Vec<T>> {
        self.transport.get(self.resource()).await
    }

    async fn get(&self, id: i64) -> StarrResult<T> {
        self.transport.get(&self.item(id)).await
    }

    async fn add(&self, entity: &T) -> StarrResult<T> {
        self.transport.post(self.resource(), entity).await
    }

    async fn update(&self, entity: &T, force: bool) -> StarrResult<T> {
        let query = [("forceSave", force.to_string())];
        self.transport
            .put(&self.item(entity.id()), &query, entity)
            .await
    }

    async fn delete(&self, id: i64) -> StarrResult<()> {
        self.transport.delete(&self.item(id)).await
    }

    async fn test(&self, entity: &T) -> StarrResult<()> {
        if !T::KIND.testable() {
            return Err(StarrError::UnsupportedOperation {
                app: self.app.clone(),
                kind: T::KIND.label(),
                operation: "test",
            });
        }

        let path = format!("{}/test", self.resource());
        self.transport.post_unit(&path, entity).await
    }
}
