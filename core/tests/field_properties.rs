//! Property tests: every tri-state survives encode then decode, and an entity
//! survives `to_properties` then `from_properties`.

use chrono::{DateTime, TimeZone, Utc};
use crm_core::{Contact, Deal, Entity, Field, FieldValue};
use proptest::prelude::*;

fn tri_state<T: std::fmt::Debug + Clone>(
    value: impl Strategy<Value = T> + 'static,
) -> impl Strategy<Value = Field<T>> {
    prop_oneof![
        Just(Field::Absent),
        Just(Field::Null),
        value.prop_map(Field::Present),
    ]
}

/// Millisecond precision, which is what the wire carries.
fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800_000).prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

fn round_trip<T: FieldValue>(field: &Field<T>) -> Field<T> {
    let encoded = field.encode();
    Field::decode("prop", encoded.as_ref()).unwrap()
}

proptest! {
    #[test]
    fn string_fields_round_trip(field in tri_state(".*")) {
        prop_assert_eq!(round_trip(&field), field);
    }

    #[test]
    fn bool_fields_round_trip(field in tri_state(any::<bool>())) {
        prop_assert_eq!(round_trip(&field), field);
    }

    #[test]
    fn int_fields_round_trip(field in tri_state(any::<i64>())) {
        prop_assert_eq!(round_trip(&field), field);
    }

    #[test]
    fn number_fields_round_trip(field in tri_state(-1e12f64..1e12)) {
        prop_assert_eq!(round_trip(&field), field.clone());
        if let Some(value) = field.encode() {
            let text = serde_json::to_string(&value).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(Field::<f64>::decode("n", Some(&parsed)).unwrap(), field);
        }
    }

    #[test]
    fn time_fields_round_trip(field in tri_state(timestamp())) {
        prop_assert_eq!(round_trip(&field), field);
    }

    #[test]
    fn stringified_ints_decode(n in any::<i64>()) {
        let raw = serde_json::Value::String(n.to_string());
        prop_assert_eq!(Field::<i64>::decode("n", Some(&raw)).unwrap(), Field::Present(n));
    }

    #[test]
    fn epoch_millis_and_rfc3339_agree(ts in timestamp()) {
        let millis = serde_json::Value::from(ts.timestamp_millis());
        let text = ts.encode();
        prop_assert_eq!(
            Field::<DateTime<Utc>>::decode("t", Some(&millis)).unwrap(),
            Field::<DateTime<Utc>>::decode("t", Some(&text)).unwrap()
        );
    }

    #[test]
    fn contact_round_trips_through_properties(
        email in tri_state(".*"),
        first_name in tri_state("[a-zA-Z]*"),
        phone in tri_state("[0-9+ ]*"),
        create_date in tri_state(timestamp()),
    ) {
        let contact = Contact { email, first_name, phone, create_date, ..Default::default() };
        let props = contact.to_properties();
        prop_assert!(props.len() <= 4);
        prop_assert_eq!(Contact::from_properties(props).unwrap(), contact);
    }

    #[test]
    fn deal_round_trips_through_serde(
        name in tri_state("[a-z ]*"),
        amount in tri_state(0f64..1e9),
        close_date in tri_state(timestamp()),
    ) {
        let deal = Deal { name, amount, close_date, ..Default::default() };
        let json = serde_json::to_string(&deal).unwrap();
        let back: Deal = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, deal);
    }
}

#[test]
fn zero_values_stay_present() {
    assert_eq!(round_trip(&Field::Present(String::new())), Field::Present(String::new()));
    assert_eq!(round_trip(&Field::Present(false)), Field::Present(false));
    assert_eq!(round_trip(&Field::Present(0i64)), Field::Present(0));
    assert_eq!(round_trip(&Field::Present(0.0f64)), Field::Present(0.0));
}

#[test]
fn numbers_survive_json_text() {
    let deal = Deal { amount: Field::Present(972590255.7025727), ..Default::default() };
    let wire = serde_json::to_string(&deal).unwrap();
    assert_eq!(wire, r#"{"amount":972590255.7025727}"#);
    let back: Deal = serde_json::from_str(&wire).unwrap();
    assert_eq!(back.amount, deal.amount);
}
