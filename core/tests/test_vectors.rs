//! Verify request building and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file describes inputs, the expected request, a simulated
//! response and the expected parse result. Bodies are compared as parsed
//! JSON unless a case pins the raw string.

use std::sync::{Arc, Mutex};

use crm_core::{
    BearerToken, Client, Contact, Crm, Error, HttpMethod, HttpRequest, HttpResponse, Owner,
    QueryOption, Transport, TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Records the request it receives and answers with a canned response.
struct Scripted {
    response: HttpResponse,
    seen: Mutex<Option<HttpRequest>>,
}

impl Transport for Scripted {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.seen.lock().unwrap() = Some(request);
        Ok(self.response.clone())
    }
}

fn scripted(case: &Value) -> (Crm, Arc<Scripted>) {
    let response = &case["response"];
    let transport = Arc::new(Scripted {
        response: HttpResponse::new(
            response["status"].as_u64().unwrap() as u16,
            response["body"].as_str().unwrap(),
        ),
        seen: Mutex::new(None),
    });
    let client = Client::new(BASE_URL, transport.clone(), Arc::new(BearerToken::new("test-token")));
    (Crm::new(&client, "v3"), transport)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect()
}

/// Compare the recorded request with `expected_request`. Keys missing from
/// the vector are not checked.
fn check_request(name: &str, transport: &Scripted, expected: &Value) {
    let req = transport.seen.lock().unwrap().take().expect("request sent");

    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    if let Some(query) = expected.get("query") {
        assert_eq!(req.query, pairs(query), "{name}: query");
    }
    if let Some(headers) = expected.get("headers") {
        assert_eq!(req.headers, pairs(headers), "{name}: headers");
    }
    if let Some(raw) = expected.get("raw_body") {
        assert_eq!(req.body.as_deref(), raw.as_str(), "{name}: raw body");
    }
    if let Some(body) = expected.get("body") {
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(&sent, body, "{name}: body");
    }
}

fn check_error(name: &str, err: Error, expected: &Value) {
    match expected["kind"].as_str().unwrap() {
        "not_found" | "api" => {
            let is_not_found = err.is_not_found();
            assert_eq!(is_not_found, expected["kind"] == "not_found", "{name}: kind ({err:?})");
            let api = err.api_error().expect("api error");
            assert_eq!(u64::from(api.status), expected["status"].as_u64().unwrap(), "{name}: status");
            assert_eq!(api.category(), expected["category"].as_str(), "{name}: category");
        }
        "decode" => {
            assert!(matches!(err, Error::Decode(_)), "{name}: expected Decode, got {err:?}");
            let message = err.to_string();
            for fragment in expected["mentions"].as_array().unwrap() {
                let fragment = fragment.as_str().unwrap();
                assert!(message.contains(fragment), "{name}: {message:?} lacks {fragment:?}");
            }
        }
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Owner update
// ---------------------------------------------------------------------------

#[test]
fn owner_update_vectors() {
    let raw = include_str!("../../test-vectors/owner_update.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: Owner = serde_json::from_value(case["input"].clone()).unwrap();
        let (crm, transport) = scripted(case);

        let result = crm.owners.update(case["id"].as_str().unwrap(), &input);
        check_request(name, &transport, &case["expected_request"]);

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected);
            continue;
        }
        let owner = result.unwrap();
        let expected = &case["expected"];
        assert_eq!(owner.id.as_deref(), expected["id"].as_str(), "{name}: id");
        assert_eq!(owner.email.as_deref(), expected["email"].as_str(), "{name}: email");
        assert_eq!(owner.first_name.as_deref(), expected["firstName"].as_str(), "{name}: firstName");
        assert_eq!(owner.last_name.as_deref(), expected["lastName"].as_str(), "{name}: lastName");
    }
}

// ---------------------------------------------------------------------------
// Owner list
// ---------------------------------------------------------------------------

#[test]
fn owner_list_vectors() {
    let raw = include_str!("../../test-vectors/owner_list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (crm, transport) = scripted(case);

        let result = crm.owners.list(None);
        check_request(name, &transport, &case["expected_request"]);

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected);
            continue;
        }
        let page = result.unwrap();
        let ids: Vec<&str> = page.results.iter().filter_map(|o| o.id.as_deref()).collect();
        let expected_ids: Vec<&str> = case["expected_ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(ids, expected_ids, "{name}: ids");
        assert_eq!(page.next_after(), case["expected_after"].as_str(), "{name}: after");

        if let Some(user_ids) = case.get("expected_user_ids") {
            let got: Vec<i64> = page.results.iter().filter_map(|o| o.user_id.get().copied()).collect();
            let want: Vec<i64> = user_ids.as_array().unwrap().iter().map(|v| v.as_i64().unwrap()).collect();
            assert_eq!(got, want, "{name}: user ids");
        }
    }
}

// ---------------------------------------------------------------------------
// Contact get
// ---------------------------------------------------------------------------

#[test]
fn contact_get_vectors() {
    let raw = include_str!("../../test-vectors/contact_get.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (crm, transport) = scripted(case);

        let strings = |key: &str| -> Vec<String> {
            case.get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().map(|v| v.as_str().unwrap().to_string()).collect())
                .unwrap_or_default()
        };
        let option = QueryOption::new()
            .with_properties(strings("properties"))
            .with_custom_properties(strings("custom_properties"));

        let result = crm.contacts.get(case["id"].as_str().unwrap(), Some(&option));
        check_request(name, &transport, &case["expected_request"]);

        if let Some(expected) = case.get("expected_error") {
            check_error(name, result.unwrap_err(), expected);
            continue;
        }
        let record = result.unwrap();
        let expected = &case["expected"];
        assert_eq!(record.id.as_deref(), expected["id"].as_str(), "{name}: id");

        let contact: &Contact = &record.properties;
        assert_eq!(contact.email.as_deref(), expected["email"].as_str(), "{name}: email");
        match expected.get("firstname") {
            Some(Value::Null) => assert!(contact.first_name.is_null(), "{name}: firstname null"),
            Some(value) => assert_eq!(contact.first_name.as_deref(), value.as_str(), "{name}: firstname"),
            None => assert!(contact.first_name.is_absent(), "{name}: firstname absent"),
        }
        if let Some(custom) = expected.get("custom").and_then(Value::as_object) {
            for (key, value) in custom {
                let got = contact.custom.get::<String>(key).unwrap();
                assert_eq!(got.as_deref(), value.as_str(), "{name}: custom {key}");
            }
        } else {
            assert!(contact.custom.is_empty(), "{name}: no custom properties");
        }
    }
}
