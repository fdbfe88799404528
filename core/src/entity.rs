//! Resource entities: declared tri-state fields plus a side map for custom
//! properties.
//!
//! # Design
//! An entity is declared once with `crm_entity!`, pairing each Rust field
//! with its wire name. The macro generates name-aware encode/decode, so an
//! absent field never reaches the wire and a malformed one is reported by
//! name. Keys that are not declared land in `custom`, a `PropertyMap`, which
//! is how portal-specific properties are read and written without a new type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::FieldDecodeError;
use crate::field::{Field, FieldValue};

/// A value object whose members are tri-state fields keyed by wire name.
pub trait Entity: Sized {
    /// Wire names of the declared fields, used as the default property list.
    fn known_fields() -> &'static [&'static str];

    fn from_properties(props: Map<String, Value>) -> Result<Self, FieldDecodeError>;

    /// Absent fields are omitted; null fields are written as `null`.
    fn to_properties(&self) -> Map<String, Value>;
}

/// Properties keyed by wire name, read and written through typed accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap(Map<String, Value>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: FieldValue>(&self, name: &str) -> Result<Field<T>, FieldDecodeError> {
        Field::decode(name, self.0.get(name))
    }

    /// Setting `Field::Absent` removes the key.
    pub fn set<T: FieldValue>(&mut self, name: &str, value: Field<T>) {
        value.encode_into(&mut self.0, name);
    }

    /// Mark `name` to be cleared on the remote record.
    pub fn clear(&mut self, name: &str) {
        self.0.insert(name.to_string(), Value::Null);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for PropertyMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Entity for PropertyMap {
    fn known_fields() -> &'static [&'static str] {
        &[]
    }

    fn from_properties(props: Map<String, Value>) -> Result<Self, FieldDecodeError> {
        Ok(Self(props))
    }

    fn to_properties(&self) -> Map<String, Value> {
        self.0.clone()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self)
    }
}

/// Declare a CRM entity.
///
/// Each field is written `name: Type => "wireName"`, where `Type` is a
/// `Field<T>`. The generated struct gains a `custom: PropertyMap` member and
/// implements `Entity`, `FieldValue` (so it nests inside other entities),
/// `Serialize`, `Deserialize`, `Default`, `Clone`, `Debug` and `PartialEq`.
///
/// ```
/// crm_core::crm_entity! {
///     pub struct Note {
///         pub body: crm_core::StringField => "hs_note_body",
///     }
/// }
/// let note = Note { body: crm_core::field::string("hi"), ..Default::default() };
/// assert_eq!(serde_json::to_string(&note).unwrap(), r#"{"hs_note_body":"hi"}"#);
/// ```
#[macro_export]
macro_rules! crm_entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
            /// Properties outside the declared set, keyed by wire name.
            pub custom: $crate::PropertyMap,
        }

        impl $crate::Entity for $name {
            fn known_fields() -> &'static [&'static str] {
                &[$($wire),*]
            }

            fn from_properties(
                mut props: $crate::__private::serde_json::Map<
                    ::std::string::String,
                    $crate::__private::serde_json::Value,
                >,
            ) -> ::std::result::Result<Self, $crate::FieldDecodeError> {
                ::std::result::Result::Ok(Self {
                    $( $field: $crate::field::take_field(&mut props, $wire)?, )*
                    custom: $crate::PropertyMap::from(props),
                })
            }

            fn to_properties(
                &self,
            ) -> $crate::__private::serde_json::Map<
                ::std::string::String,
                $crate::__private::serde_json::Value,
            > {
                let mut props = self.custom.clone().into_inner();
                $( self.$field.encode_into(&mut props, $wire); )*
                props
            }
        }

        impl $crate::FieldValue for $name {
            fn decode(
                raw: &$crate::__private::serde_json::Value,
            ) -> ::std::result::Result<Self, ::std::string::String> {
                match raw.as_object() {
                    ::std::option::Option::Some(obj) => {
                        <Self as $crate::Entity>::from_properties(obj.clone())
                            .map_err(|e| e.to_string())
                    }
                    ::std::option::Option::None => {
                        ::std::result::Result::Err("expected an object".to_string())
                    }
                }
            }

            fn encode(&self) -> $crate::__private::serde_json::Value {
                $crate::__private::serde_json::Value::Object(
                    <Self as $crate::Entity>::to_properties(self),
                )
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(
                    &<Self as $crate::Entity>::to_properties(self),
                    serializer,
                )
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let props = <$crate::__private::serde_json::Map<
                    ::std::string::String,
                    $crate::__private::serde_json::Value,
                > as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::Entity>::from_properties(props)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
