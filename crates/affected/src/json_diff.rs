use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Added,
    Deleted,
    Modified,
}

/// A single field-level change between two JSON documents. Array
/// elements are addressed by their index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonChange {
    pub type_of: DiffType,
    pub path: Vec<String>,
    pub lhs: Option<Value>,
    pub rhs: Option<Value>,
}

impl JsonChange {
    pub fn new(type_of: DiffType, path: &[&str]) -> Self {
        Self {
            type_of,
            path: path.iter().map(|key| key.to_string()).collect(),
            lhs: None,
            rhs: None,
        }
    }

    pub fn is_under(&self, key: &str) -> bool {
        self.path.first().is_some_and(|first| first == key)
    }
}

/// Compare two JSON documents and return every changed field. A change to
/// a nested field is also reported for each of its parents, so consumers
/// can match at whichever depth they care about.
pub fn json_diff(lhs: &Value, rhs: &Value) -> Vec<JsonChange> {
    let mut changes = vec![];

    walk_json_tree(lhs, &mut vec![], &mut |path: &[String], lhs_value: &Value| {
        match get_json_value(rhs, path) {
            None => changes.push(JsonChange {
                type_of: DiffType::Deleted,
                path: path.to_vec(),
                lhs: Some(lhs_value.clone()),
                rhs: None,
            }),
            Some(rhs_value) if rhs_value != lhs_value => changes.push(JsonChange {
                type_of: DiffType::Modified,
                path: path.to_vec(),
                lhs: Some(lhs_value.clone()),
                rhs: Some(rhs_value.clone()),
            }),
            _ => {}
        };
    });

    walk_json_tree(rhs, &mut vec![], &mut |path: &[String], rhs_value: &Value| {
        if get_json_value(lhs, path).is_none() {
            changes.push(JsonChange {
                type_of: DiffType::Added,
                path: path.to_vec(),
                lhs: None,
                rhs: Some(rhs_value.clone()),
            });
        }
    });

    changes
}

fn walk_json_tree(
    json: &Value,
    path: &mut Vec<String>,
    visitor: &mut dyn FnMut(&[String], &Value),
) {
    let entries = match json {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect::<Vec<_>>(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        _ => return,
    };

    for (key, value) in entries {
        path.push(key);
        visitor(path, value);
        walk_json_tree(value, path, visitor);
        path.pop();
    }
}

fn get_json_value<'json>(json: &'json Value, path: &[String]) -> Option<&'json Value> {
    path.iter().try_fold(json, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    })
}
