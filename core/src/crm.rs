//! The CRM facade.
//!
//! # Design
//! Each resource is a `ResourceService` rooted at its own path under
//! `crm/{version}`. Object resources come back wrapped in `ObjectResource`.
//! Owners, schemas and property definitions come back flat, so their
//! services decode straight into the entity.

use crate::association::ObjectType;
use crate::client::Client;
use crate::resources::{Company, Contact, Deal, Owner, Property, Schema, Ticket};
use crate::service::ResourceService;

const CRM_BASE_PATH: &str = "crm";
const OBJECTS_BASE_PATH: &str = "objects";

/// The CRM resource services, all sharing one `Client`.
#[derive(Debug, Clone)]
pub struct Crm {
    pub contacts: ResourceService<Contact>,
    pub companies: ResourceService<Company>,
    pub deals: ResourceService<Deal>,
    pub tickets: ResourceService<Ticket>,
    pub owners: ResourceService<Owner, Owner>,
    pub schemas: ResourceService<Schema, Schema>,
    client: Client,
    crm_path: String,
}

impl Crm {
    pub fn new(client: &Client, api_version: &str) -> Self {
        let crm_path = format!("{CRM_BASE_PATH}/{api_version}");
        let object = |name: &str| format!("{crm_path}/{OBJECTS_BASE_PATH}/{name}");
        Self {
            contacts: ResourceService::new(client.clone(), object("contacts")),
            companies: ResourceService::new(client.clone(), object("companies")),
            deals: ResourceService::new(client.clone(), object("deals")),
            tickets: ResourceService::new(client.clone(), object("tickets")),
            owners: ResourceService::new(client.clone(), format!("{crm_path}/owners")),
            schemas: ResourceService::flat(client.clone(), format!("{crm_path}/schemas")),
            client: client.clone(),
            crm_path,
        }
    }

    /// Property definitions of `object_type`, addressed by property name.
    pub fn properties(&self, object_type: &ObjectType) -> ResourceService<Property, Property> {
        ResourceService::flat(
            self.client.clone(),
            format!("{}/properties/{object_type}", self.crm_path),
        )
    }
}
