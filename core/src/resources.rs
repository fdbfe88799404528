//! Entity declarations for the built-in CRM resources.
//!
//! Owners are returned flat (fields at the top level of the record). The
//! object resources are returned inside `ObjectResource::properties`, and
//! their wire names are the CRM's internal property names.

use crate::crm_entity;
use crate::field::{BoolField, Field, IntField, NumberField, StringField, TimeField};

crm_entity! {
    /// A CRM user who can own records.
    pub struct Owner {
        pub id: StringField => "id",
        pub email: StringField => "email",
        pub first_name: StringField => "firstName",
        pub last_name: StringField => "lastName",
        /// `PERSON` or `QUEUE`.
        pub kind: StringField => "type",
        pub user_id: IntField => "userId",
        pub user_id_including_inactive: IntField => "userIdIncludingInactive",
        pub created_at: TimeField => "createdAt",
        pub updated_at: TimeField => "updatedAt",
        pub archived: BoolField => "archived",
        pub teams: Field<Vec<OwnerTeam>> => "teams",
    }
}

crm_entity! {
    pub struct OwnerTeam {
        pub id: StringField => "id",
        pub name: StringField => "name",
        pub primary: BoolField => "primary",
    }
}

crm_entity! {
    pub struct Contact {
        pub email: StringField => "email",
        pub first_name: StringField => "firstname",
        pub last_name: StringField => "lastname",
        pub phone: StringField => "phone",
        pub company: StringField => "company",
        pub website: StringField => "website",
        pub lifecycle_stage: StringField => "lifecyclestage",
        pub owner_id: StringField => "hubspot_owner_id",
        pub create_date: TimeField => "createdate",
        pub last_modified_date: TimeField => "lastmodifieddate",
        pub object_id: StringField => "hs_object_id",
    }
}

crm_entity! {
    pub struct Company {
        pub name: StringField => "name",
        pub domain: StringField => "domain",
        pub industry: StringField => "industry",
        pub phone: StringField => "phone",
        pub city: StringField => "city",
        pub country: StringField => "country",
        pub number_of_employees: IntField => "numberofemployees",
        pub owner_id: StringField => "hubspot_owner_id",
        pub create_date: TimeField => "createdate",
        pub last_modified_date: TimeField => "hs_lastmodifieddate",
        pub object_id: StringField => "hs_object_id",
    }
}

crm_entity! {
    pub struct Deal {
        pub name: StringField => "dealname",
        pub amount: NumberField => "amount",
        pub stage: StringField => "dealstage",
        pub pipeline: StringField => "pipeline",
        pub close_date: TimeField => "closedate",
        pub owner_id: StringField => "hubspot_owner_id",
        pub create_date: TimeField => "createdate",
        pub last_modified_date: TimeField => "hs_lastmodifieddate",
        pub object_id: StringField => "hs_object_id",
    }
}

crm_entity! {
    pub struct Ticket {
        pub subject: StringField => "subject",
        pub content: StringField => "content",
        pub pipeline: StringField => "hs_pipeline",
        pub stage: StringField => "hs_pipeline_stage",
        pub priority: StringField => "hs_ticket_priority",
        pub category: StringField => "hs_ticket_category",
        pub owner_id: StringField => "hubspot_owner_id",
        pub create_date: TimeField => "createdate",
        pub last_modified_date: TimeField => "hs_lastmodifieddate",
        pub object_id: StringField => "hs_object_id",
    }
}

crm_entity! {
    /// Definition of a single CRM property, as served by the properties API.
    pub struct Property {
        pub name: StringField => "name",
        pub label: StringField => "label",
        /// Storage type: `string`, `number`, `date`, `datetime`, `enumeration`, `bool`.
        pub kind: StringField => "type",
        pub field_type: StringField => "fieldType",
        pub group_name: StringField => "groupName",
        pub description: StringField => "description",
        pub display_order: IntField => "displayOrder",
        pub hidden: BoolField => "hidden",
        pub form_field: BoolField => "formField",
        pub calculated: BoolField => "calculated",
        pub external_options: BoolField => "externalOptions",
        pub has_unique_value: BoolField => "hasUniqueValue",
        pub options: Field<Vec<PropertyOption>> => "options",
        pub created_at: TimeField => "createdAt",
        pub updated_at: TimeField => "updatedAt",
        pub archived: BoolField => "archived",
    }
}

crm_entity! {
    pub struct PropertyOption {
        pub label: StringField => "label",
        pub value: StringField => "value",
        pub description: StringField => "description",
        pub display_order: IntField => "displayOrder",
        pub hidden: BoolField => "hidden",
    }
}

crm_entity! {
    /// A custom object schema.
    pub struct Schema {
        pub id: StringField => "id",
        pub name: StringField => "name",
        pub labels: Field<SchemaLabels> => "labels",
        pub object_type_id: StringField => "objectTypeId",
        pub fully_qualified_name: StringField => "fullyQualifiedName",
        pub primary_display_property: StringField => "primaryDisplayProperty",
        pub required_properties: Field<Vec<String>> => "requiredProperties",
        pub searchable_properties: Field<Vec<String>> => "searchableProperties",
        pub secondary_display_properties: Field<Vec<String>> => "secondaryDisplayProperties",
        pub properties: Field<Vec<Property>> => "properties",
        pub created_at: TimeField => "createdAt",
        pub updated_at: TimeField => "updatedAt",
        pub archived: BoolField => "archived",
    }
}

crm_entity! {
    pub struct SchemaLabels {
        pub singular: StringField => "singular",
        pub plural: StringField => "plural",
    }
}
