//! Typed client core for a CRM REST API.
//!
//! # Overview
//! Reads and writes CRM records (contacts, companies, deals, tickets,
//! owners) and their schema and property definitions without hand-building requests or hand-parsing tri-state JSON.
//!
//! # Design
//! - `Field<T>` distinguishes absent, explicitly null and present values, so
//!   a partial update sends exactly what the caller touched.
//! - `crm_entity!` declares entities with wire names and a custom-property
//!   side map.
//! - `Client` is the one dispatch layer: path joining, `properties`
//!   envelopes, query encoding and error mapping live there. It holds no
//!   mutable state and is safe to share across threads.
//! - `Transport` and `CredentialProvider` are the I/O seams; `UreqTransport`
//!   and `BearerToken` are the defaults.
//! - `ResourceService<E, R>` is the single parameterized service every
//!   resource is an instance of; `Crm` wires the built-in ones.

pub mod association;
pub mod client;
pub mod config;
pub mod crm;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod field;
pub mod http;
pub mod query;
pub mod resources;
pub mod service;
pub mod transport;

pub use association::{
    AssociationCategory, AssociationConfig, AssociationKind, AssociationSpec, AssociationType,
    ObjectType,
};
pub use client::Client;
pub use config::ClientConfig;
pub use crm::Crm;
pub use entity::{Entity, PropertyMap};
pub use envelope::{
    AssociatedObject, AssociationLabel, AssociationRecord, ListResponse, ObjectResource, Paging,
    RequestPayload,
};
pub use error::{ApiError, Error, ErrorDetails, FieldDecodeError, Result, TransportError};
pub use field::{BoolField, Field, FieldValue, IntField, NumberField, StringField, TimeField};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::QueryOption;
pub use resources::{
    Company, Contact, Deal, Owner, OwnerTeam, Property, PropertyOption, Schema, SchemaLabels, Ticket,
};
pub use service::ResourceService;
pub use transport::{BearerToken, CredentialProvider, Transport, UreqTransport};

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
