//! Association path building.
//!
//! # Design
//! Associating two records is a PUT below the source record's path. The
//! shape of the trailing segments depends on the kind of association:
//! default links, typed links named by an association type, and labelled
//! links identified by category and numeric type id (which also need a
//! body). Listing a record's associations is a paginated GET on
//! `associations/{to}`. Everything here is pure string building.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A CRM object type as it appears in URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Contacts,
    Companies,
    Deals,
    Tickets,
    Owners,
    /// A custom object, addressed by its `objectTypeId` or fully qualified name.
    Custom(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Contacts => "contacts",
            ObjectType::Companies => "companies",
            ObjectType::Deals => "deals",
            ObjectType::Tickets => "tickets",
            ObjectType::Owners => "owners",
            ObjectType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who defined an association label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationCategory {
    HubspotDefined,
    UserDefined,
    IntegratorDefined,
}

/// Named association type for typed links, e.g. `contact_to_company`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociationType(Cow<'static, str>);

impl AssociationType {
    pub const CONTACT_TO_COMPANY: Self = Self(Cow::Borrowed("contact_to_company"));
    pub const CONTACT_TO_DEAL: Self = Self(Cow::Borrowed("contact_to_deal"));
    pub const CONTACT_TO_TICKET: Self = Self(Cow::Borrowed("contact_to_ticket"));
    pub const COMPANY_TO_CONTACT: Self = Self(Cow::Borrowed("company_to_contact"));
    pub const COMPANY_TO_DEAL: Self = Self(Cow::Borrowed("company_to_deal"));
    pub const DEAL_TO_CONTACT: Self = Self(Cow::Borrowed("deal_to_contact"));
    pub const DEAL_TO_COMPANY: Self = Self(Cow::Borrowed("deal_to_company"));
    pub const TICKET_TO_CONTACT: Self = Self(Cow::Borrowed("ticket_to_contact"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssociationKind {
    /// The unlabelled default link between two object types.
    #[default]
    Default,
    Typed(AssociationType),
    Labelled {
        category: AssociationCategory,
        type_id: u32,
    },
}

/// Body element sent with a labelled association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationSpec {
    pub association_category: AssociationCategory,
    pub association_type_id: u32,
}

/// Target of an association call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationConfig {
    pub to_object: Option<ObjectType>,
    pub to_object_id: String,
    pub kind: AssociationKind,
}

impl AssociationConfig {
    pub fn new(to_object: ObjectType, to_object_id: impl Into<String>) -> Self {
        Self {
            to_object: Some(to_object),
            to_object_id: to_object_id.into(),
            kind: AssociationKind::Default,
        }
    }

    pub fn typed(mut self, association_type: AssociationType) -> Self {
        self.kind = AssociationKind::Typed(association_type);
        self
    }

    pub fn labelled(mut self, category: AssociationCategory, type_id: u32) -> Self {
        self.kind = AssociationKind::Labelled { category, type_id };
        self
    }

    /// Path segment appended to `{objectPath}/{id}/`.
    pub fn association_path(&self) -> Result<String> {
        let to = self
            .to_object
            .as_ref()
            .ok_or_else(|| Error::Config("association target object type is not set".into()))?;
        if self.to_object_id.is_empty() {
            return Err(Error::Config("association target object id is not set".into()));
        }
        let path = match &self.kind {
            AssociationKind::Default => format!("associations/default/{to}/{}", self.to_object_id),
            AssociationKind::Typed(t) => {
                format!("associations/{to}/{}/{}", self.to_object_id, t.as_str())
            }
            AssociationKind::Labelled { .. } => format!("associations/{to}/{}", self.to_object_id),
        };
        Ok(path)
    }

    /// Body for the PUT, if this kind of association needs one.
    pub fn body(&self) -> Option<Vec<AssociationSpec>> {
        match self.kind {
            AssociationKind::Labelled { category, type_id } => Some(vec![AssociationSpec {
                association_category: category,
                association_type_id: type_id,
            }]),
            _ => None,
        }
    }

    /// Path segment for listing associations to `to`; paginate with
    /// `QueryOption::limit` and `QueryOption::after`.
    pub fn list_path(to: &ObjectType) -> String {
        format!("associations/{to}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_association_path() {
        let conf = AssociationConfig::new(ObjectType::Companies, "9");
        assert_eq!(conf.association_path().unwrap(), "associations/default/companies/9");
        assert!(conf.body().is_none());
    }

    #[test]
    fn typed_association_path() {
        let conf = AssociationConfig::new(ObjectType::Deals, "77")
            .typed(AssociationType::CONTACT_TO_DEAL);
        assert_eq!(conf.association_path().unwrap(), "associations/deals/77/contact_to_deal");
    }

    #[test]
    fn labelled_association_path_and_body() {
        let conf = AssociationConfig::new(ObjectType::Custom("2-123456".into()), "5")
            .labelled(AssociationCategory::UserDefined, 36);
        assert_eq!(conf.association_path().unwrap(), "associations/2-123456/5");
        let body = serde_json::to_value(conf.body().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{"associationCategory": "USER_DEFINED", "associationTypeId": 36}])
        );
    }

    #[test]
    fn missing_target_type_is_config_error() {
        let conf = AssociationConfig {
            to_object_id: "1".into(),
            ..Default::default()
        };
        assert!(matches!(conf.association_path(), Err(Error::Config(_))));
    }

    #[test]
    fn missing_target_id_is_config_error() {
        let conf = AssociationConfig::new(ObjectType::Contacts, "");
        assert!(matches!(conf.association_path(), Err(Error::Config(_))));
    }

    #[test]
    fn list_path() {
        assert_eq!(AssociationConfig::list_path(&ObjectType::Tickets), "associations/tickets");
    }
}
