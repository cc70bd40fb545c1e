//! HTTP source tests against a local mock server.
//!
//! These cover syntax detection from `Content-Type`, the 404-as-missing
//! rule, and error mapping for other failures.

use layered_config::sources::{self, ParseOptions, Syntax};
use layered_config::{ConfigError, LayerSink, LayerStack};
use url::Url;

fn url(server: &mockito::Server, path: &str) -> Url {
    Url::parse(&format!("{}{path}", server.url())).unwrap()
}

#[test]
fn test_json_body_is_parsed() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/app")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"service": {"name": "remote"}}"#)
        .create();

    let tree = sources::parse_url(&url(&server, "/app"), &ParseOptions::defaults())
        .unwrap()
        .unwrap();

    mock.assert();
    assert_eq!(tree.get_str("service.name"), Some("remote"));
}

#[test]
fn test_syntax_follows_content_type() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/settings")
        .with_status(200)
        .with_header("content-type", "application/yaml")
        .with_body("limits:\n  max: 10\n")
        .create();

    let tree = sources::parse_url(&url(&server, "/settings"), &ParseOptions::defaults())
        .unwrap()
        .unwrap();
    assert_eq!(tree.get_i64("limits.max"), Some(10));
}

#[test]
fn test_forced_syntax_beats_content_type() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/forced")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("answer = 42\n")
        .create();

    let options = ParseOptions::defaults().with_syntax(Syntax::Toml);
    let tree = sources::parse_url(&url(&server, "/forced"), &options)
        .unwrap()
        .unwrap();
    assert_eq!(tree.get_i64("answer"), Some(42));
}

#[test]
fn test_not_found_is_absent_when_allowed() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/missing.json").with_status(404).create();

    let result = sources::parse_url(&url(&server, "/missing.json"), &ParseOptions::defaults());
    assert!(matches!(result, Ok(None)));
}

#[test]
fn test_not_found_is_an_error_when_required() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/missing.json").with_status(404).create();

    let options = ParseOptions::defaults().with_allow_missing(false);
    let err = sources::parse_url(&url(&server, "/missing.json"), &options).unwrap_err();
    assert!(matches!(err, ConfigError::SourceUnavailable { .. }));
}

#[test]
fn test_server_error_is_unavailable_even_when_optional() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/boom.json").with_status(500).create();

    let err = sources::parse_url(&url(&server, "/boom.json"), &ParseOptions::defaults())
        .unwrap_err();
    assert!(matches!(err, ConfigError::SourceUnavailable { .. }));
}

#[test]
fn test_invalid_body_is_a_parse_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/broken.json")
        .with_status(200)
        .with_body("{ not json")
        .create();

    let err = sources::parse_url(&url(&server, "/broken.json"), &ParseOptions::defaults())
        .unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_url_layer_is_fetched_on_every_resolve() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/live.json")
        .with_status(200)
        .with_body(r#"{"live": true}"#)
        .expect(2)
        .create();

    let mut stack = LayerStack::new();
    stack
        .parse_url(&format!("{}/live.json", server.url()))
        .unwrap();

    assert_eq!(stack.resolve().unwrap().get_bool("live"), Some(true));
    assert_eq!(stack.resolve().unwrap().get_bool("live"), Some(true));
    mock.assert();
}

#[test]
fn test_unsupported_scheme_is_unavailable() {
    let url = Url::parse("ftp://example.invalid/app.json").unwrap();
    let err = sources::parse_url(&url, &ParseOptions::defaults()).unwrap_err();
    assert!(matches!(err, ConfigError::SourceUnavailable { .. }));
}
