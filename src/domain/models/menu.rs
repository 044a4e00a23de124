#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

/// Many2one references come back as `false`, `null`, a bare id, or an
/// `[id, "display name"]` pair.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = match value {
        Value::Number(num) => num.as_i64(),
        Value::Array(pair) => pair.first().and_then(|e| return e.as_i64()),
        _ => None,
    };

    return Ok(id.filter(|id| return *id != 0));
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub action: Option<i64>,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn is_leaf(&self) -> bool {
        return self.children.is_empty();
    }
}

/// Window action resolved for the selected app.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub res_model: String,
    #[serde(default)]
    pub view_mode: String,
}
