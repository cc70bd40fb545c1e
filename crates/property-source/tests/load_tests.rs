//! Loading a property source through the configuration factory.

use std::fs;

use layered_config::constants::{RESOURCE_PATH_PROPERTY, STRATEGY_PROPERTY_NAME};
use layered_config::properties::clear_property;
use layered_config::{ConfigTree, LayerSink, LayeredLoadingStrategy, factory, set_property};
use layered_config_property_source::{DEFAULT_PROPERTY_SOURCE_NAME, PropertySource};
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

fn cleanup() {
    clear_property(RESOURCE_PATH_PROPERTY);
    clear_property(STRATEGY_PROPERTY_NAME);
    factory::invalidate_caches();
}

#[test]
#[serial]
fn test_load_uses_default_name_and_application_resource() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "app:\n  name: demo\n  tags: [x, y]\n",
    )
    .unwrap();
    set_property(RESOURCE_PATH_PROPERTY, dir.path().to_string_lossy());
    factory::invalidate_caches();

    let source = PropertySource::load();
    cleanup();

    let source = source.unwrap();
    assert_eq!(source.name(), DEFAULT_PROPERTY_SOURCE_NAME);
    assert_eq!(source.get_property("app.name"), Some(&json!("demo")));
    assert_eq!(source.get_property("app.tags[1]"), Some(&json!("y")));
    assert!(!source.contains_property("app"));
}

#[test]
#[serial]
fn test_load_named_sees_installed_layers() {
    let strategy = LayeredLoadingStrategy::builder()
        .with_tree(ConfigTree::from_dotted_pairs([("feature.enabled", "yes")]))
        .install();

    let source = PropertySource::load_named("layers");
    strategy.uninstall();
    cleanup();

    let source = source.unwrap();
    assert_eq!(source.name(), "layers");
    assert_eq!(source.get_property("feature.enabled"), Some(&json!("yes")));
}
