use serde::Deserialize;
use serde_json::Value;

/// Text stored for a value bound to one of the plain text columns.
///
/// Strings are stored as is; any other JSON value is stored as its JSON text,
/// so `5` becomes `"5"`.
pub fn column_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A partial update to a collection row.
///
/// A key that is missing from the request and a key sent as `null` both
/// deserialize to `None` and are left untouched. Any other value counts as
/// provided, whatever its JSON type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectionChanges {
    #[serde(default)]
    pub uid: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub method: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// A parameterized `UPDATE` ready for binding: `values` bind to `$1..$n`
/// in order, `id` binds last.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    pub values: Vec<String>,
    pub id: i64,
}

impl CollectionChanges {
    pub fn is_empty(&self) -> bool {
        self.uid.is_none()
            && self.name.is_none()
            && self.url.is_none()
            && self.method.is_none()
            && self.params.is_none()
            && self.headers.is_none()
            && self.body.is_none()
    }

    /// Column/value pairs for every provided field, in column order.
    /// Text columns go through [`column_text`]; JSON columns are serialized.
    pub fn assignments(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut out = Vec::new();

        let text_columns = [
            ("uid", &self.uid),
            ("name", &self.name),
            ("url", &self.url),
            ("method", &self.method),
        ];
        for (column, value) in text_columns {
            if let Some(v) = value {
                out.push((column, column_text(v)));
            }
        }

        let json_columns = [
            ("params", &self.params),
            ("headers", &self.headers),
            ("body", &self.body),
        ];
        for (column, value) in json_columns {
            if let Some(v) = value {
                out.push((column, serde_json::to_string(v)?));
            }
        }

        Ok(out)
    }

    /// Build the `UPDATE` for this change set, or `None` when nothing was provided.
    pub fn to_update(&self, table: &str, id: i64) -> Result<Option<UpdateStatement>, serde_json::Error> {
        let assignments = self.assignments()?;
        if assignments.is_empty() {
            return Ok(None);
        }

        let set_clauses: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("\"{}\" = ${}", column, i + 1))
            .collect();

        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE id = ${}",
            table,
            set_clauses.join(", "),
            assignments.len() + 1
        );

        Ok(Some(UpdateStatement {
            sql,
            values: assignments.into_iter().map(|(_, v)| v).collect(),
            id,
        }))
    }
}
