//! Generic resource service.
//!
//! # Design
//! Resource services differ only in base path, entity type and response
//! shape, so one parameterized type covers them all. The base path is fixed
//! at construction; each call appends an id or sub-segment and delegates to
//! the dispatch `Client`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::association::{AssociationConfig, ObjectType};
use crate::client::Client;
use crate::entity::Entity;
use crate::envelope::{AssociationRecord, ListResponse, ObjectResource};
use crate::error::Result;
use crate::query::QueryOption;

/// CRUD and association calls for one resource type.
///
/// `E` is the entity sent on create/update; `R` is the shape each record is
/// returned in (`ObjectResource<E>` for CRM objects, `E` itself for flat
/// resources such as owners).
pub struct ResourceService<E, R = ObjectResource<E>> {
    client: Client,
    path: String,
    /// Writes are wrapped as `{"properties": entity}`.
    enveloped: bool,
    _marker: PhantomData<fn() -> (E, R)>,
}

impl<E, R> Clone for ResourceService<E, R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path.clone(),
            enveloped: self.enveloped,
            _marker: PhantomData,
        }
    }
}

impl<E, R> fmt::Debug for ResourceService<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<E, R> ResourceService<E, R>
where
    E: Entity + Serialize,
    R: DeserializeOwned,
{
    pub fn new(client: Client, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into().trim_matches('/').to_string(),
            enveloped: true,
            _marker: PhantomData,
        }
    }

    /// A service whose create and update bodies are the bare entity, as for
    /// schema and property definitions.
    pub fn flat(client: Client, path: impl Into<String>) -> Self {
        Self {
            enveloped: false,
            ..Self::new(client, path)
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn record_path(&self, id: &str) -> String {
        format!("{}/{id}", self.path)
    }

    /// One page of records. Without explicit properties, the entity's
    /// declared fields are requested.
    pub fn list(&self, option: Option<&QueryOption>) -> Result<ListResponse<R>> {
        let option = self.resolve(option);
        self.client.get(&self.path, Some(&option))
    }

    pub fn get(&self, id: &str, option: Option<&QueryOption>) -> Result<R> {
        let option = self.resolve(option);
        self.client.get(&self.record_path(id), Some(&option))
    }

    pub fn create(&self, entity: &E) -> Result<R> {
        if self.enveloped {
            self.client.post(&self.path, entity)
        } else {
            self.client.post_raw(&self.path, entity)
        }
    }

    /// Partial update: absent fields are left unchanged remotely, null
    /// fields are cleared.
    pub fn update(&self, id: &str, entity: &E) -> Result<R> {
        let path = self.record_path(id);
        if self.enveloped {
            self.client.patch(&path, entity)
        } else {
            self.client.patch_raw(&path, entity)
        }
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&self.record_path(id), None)
    }

    /// Associate record `id` with the target named in `config`.
    pub fn associate(&self, id: &str, config: &AssociationConfig) -> Result<R> {
        let path = format!("{}/{}", self.record_path(id), config.association_path()?);
        match config.body() {
            Some(body) => self.client.put(&path, &body),
            None => self.client.put_empty(&path),
        }
    }

    /// One page of associations from record `id` to objects of type `to`.
    pub fn list_associations(
        &self,
        id: &str,
        to: &ObjectType,
        option: Option<&QueryOption>,
    ) -> Result<ListResponse<AssociationRecord>> {
        let path = format!("{}/{}", self.record_path(id), AssociationConfig::list_path(to));
        self.client.get(&path, option)
    }

    fn resolve(&self, option: Option<&QueryOption>) -> QueryOption {
        option.cloned().unwrap_or_default().setup_properties(E::known_fields())
    }
}
