//! Depth-first walk over a configuration tree that reports binder-style paths.

use layered_config::ConfigTree;
use serde_json::{Map, Value};

/// Callbacks for [`walk_tree`]. Every method defaults to a no-op.
///
/// `parent` is the position of the enclosing node (empty at the root) and
/// `position` is the full path of the visited node.
pub(crate) trait TreeVisitor {
    /// Called for every node before any of the more specific callbacks.
    fn on_any(&mut self, _parent: &str, _position: &str, _value: &Value) {}

    fn on_map(&mut self, _parent: &str, _position: &str, _map: &Map<String, Value>) {}

    fn on_list(&mut self, _parent: &str, _position: &str, _list: &[Value]) {}

    /// Scalars, including `null`.
    fn on_value(&mut self, _parent: &str, _position: &str, _value: &Value) {}
}

pub(crate) fn walk_tree<V: TreeVisitor + ?Sized>(tree: &ConfigTree, visitor: &mut V) {
    for (key, value) in tree.root() {
        walk("", key, value, visitor);
    }
}

fn walk<V: TreeVisitor + ?Sized>(parent: &str, position: &str, value: &Value, visitor: &mut V) {
    visitor.on_any(parent, position, value);
    match value {
        Value::Object(map) => {
            visitor.on_map(parent, position, map);
            for (key, child) in map {
                walk(position, &format!("{position}.{key}"), child, visitor);
            }
        }
        Value::Array(list) => {
            visitor.on_list(parent, position, list);
            for (index, child) in list.iter().enumerate() {
                walk(position, &format!("{position}[{index}]"), child, visitor);
            }
        }
        scalar => visitor.on_value(parent, position, scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TreeVisitor for Recorder {
        fn on_map(&mut self, parent: &str, position: &str, _map: &Map<String, Value>) {
            self.events.push(format!("map {parent}|{position}"));
        }

        fn on_list(&mut self, parent: &str, position: &str, list: &[Value]) {
            self.events.push(format!("list {parent}|{position}|{}", list.len()));
        }

        fn on_value(&mut self, parent: &str, position: &str, value: &Value) {
            self.events.push(format!("value {parent}|{position}|{value}"));
        }
    }

    #[test]
    fn test_walk_reports_parent_and_position() {
        let tree = ConfigTree::from_value(json!({
            "a": {"b": [1, {"c": true}]},
        }))
        .unwrap();

        let mut recorder = Recorder::default();
        walk_tree(&tree, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "map |a",
                "list a|a.b|2",
                "value a.b|a.b[0]|1",
                "map a.b|a.b[1]",
                "value a.b[1]|a.b[1].c|true",
            ]
        );
    }

    #[test]
    fn test_on_any_sees_every_node() {
        struct Counter(usize);
        impl TreeVisitor for Counter {
            fn on_any(&mut self, _: &str, _: &str, _: &Value) {
                self.0 += 1;
            }
        }

        let tree = ConfigTree::from_value(json!({"x": {"y": [null, 2]}, "z": "s"})).unwrap();
        let mut counter = Counter(0);
        walk_tree(&tree, &mut counter);

        // x, x.y, x.y[0], x.y[1], z
        assert_eq!(counter.0, 5);
    }
}
