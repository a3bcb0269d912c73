use dtogen_runtime::{DecodeError, DtoHash, JsonObject, JsonSerializable, Value};

/// Hand-written implementation of the schema's `LegacyNote` interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyNote {
    pub text:   String,
    pub pinned: bool,
}

impl LegacyNote {
    pub fn new(text: impl Into<String>) -> Self {
        LegacyNote { text: text.into(), pinned: false }
    }
}

impl JsonSerializable for LegacyNote {
    fn to_json_value_with(&self, _copy_jsons: bool) -> Value {
        let mut json = JsonObject::new();
        json.insert("text".to_string(), Value::String(self.text.clone()));
        json.insert("pinned".to_string(), Value::Bool(self.pinned));
        Value::Object(json)
    }

    fn from_json_value_with(value: Value, _copy_jsons: bool) -> Result<Option<Self>, DecodeError> {
        let mut json = match value {
            Value::Null => return Ok(None),
            Value::Object(json) => json,
            other => return Err(DecodeError::mismatch("LegacyNote", "object", &other)),
        };
        let text = match json.remove("text") {
            Some(value) => dtogen_runtime::decode_opt_string(value, "LegacyNote.text")?.unwrap_or_default(),
            None => String::new(),
        };
        let pinned = match json.remove("pinned") {
            Some(value) => dtogen_runtime::decode_opt_bool(&value, "LegacyNote.pinned")?.unwrap_or_default(),
            None => false,
        };
        Ok(Some(LegacyNote { text, pinned }))
    }
}

impl DtoHash for LegacyNote {
    fn dto_hash(&self) -> i32 {
        dtogen_runtime::hash_step(self.text.dto_hash(), self.pinned.dto_hash())
    }
}
