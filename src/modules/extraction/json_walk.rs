use serde_json::Value;
use tracing::debug;

/// Lazy pre-order walk yielding every scalar stored under `key`, at any depth.
///
/// Arrays are visited in index order; objects in the map's iteration order,
/// which is document order with `serde_json/preserve_order`. That order is an
/// implementation detail of the JSON map, not a guarantee across equivalent
/// documents. A clone taken before iterating replays the same walk.
#[derive(Debug, Clone)]
pub struct FieldValues<'a> {
    key: &'a str,
    stack: Vec<(Option<&'a str>, &'a Value)>,
}

pub fn extract_field<'a>(document: &'a Value, key: &'a str) -> FieldValues<'a> {
    FieldValues { key, stack: vec![(None, document)] }
}

impl<'a> Iterator for FieldValues<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((entry_key, node)) = self.stack.pop() {
            match node {
                Value::Object(map) => {
                    self.stack.extend(map.iter().rev().map(|(k, v)| (Some(k.as_str()), v)));
                }
                Value::Array(items) => {
                    self.stack.extend(items.iter().rev().map(|v| (None, v)));
                }
                scalar => {
                    if entry_key == Some(self.key) {
                        if let Some(text) = scalar_text(scalar) {
                            return Some(text);
                        }
                    }
                }
            }
        }
        None
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One identifier together with every URL found beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CveRecord {
    pub id: String,
    pub urls: Vec<String>,
}

/// Splits the document into maximal sub-trees holding exactly one identifier;
/// each sub-tree becomes a record carrying the URLs found inside it.
pub fn extract_records(document: &Value, id_key: &str, url_key: &str) -> Vec<CveRecord> {
    let mut records = Vec::new();
    collect_records(document, id_key, url_key, &mut records);
    records
}

fn collect_records(node: &Value, id_key: &str, url_key: &str, out: &mut Vec<CveRecord>) {
    let mut ids = extract_field(node, id_key);
    match (ids.next(), ids.next()) {
        (None, _) => {}
        (Some(id), None) => out.push(CveRecord {
            id,
            urls: extract_field(node, url_key).collect(),
        }),
        (Some(_), Some(_)) => {
            // 多个 ID：下钻到子节点，直接挂在本层的 ID 无法归属到唯一记录
            if let Value::Object(map) = node {
                if let Some(orphan) = map.get(id_key).and_then(scalar_text) {
                    debug!("identifier {} shares its level with other records; skipped", orphan);
                }
            }
            for child in children(node) {
                collect_records(child, id_key, url_key, out);
            }
        }
    }
}

fn children(node: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match node {
        Value::Object(map) => Box::new(map.values().filter(|v| v.is_object() || v.is_array())),
        Value::Array(items) => Box::new(items.iter().filter(|v| v.is_object() || v.is_array())),
        _ => Box::new(std::iter::empty()),
    }
}
