//! Declarative node metadata, serialized in the shape the host's form
//! renderer expects (camelCase keys, optional parts omitted).

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    #[serde(rename = "type")]
    pub node_type: String,
    pub default_label: String,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form: Vec<FormEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Appearance>,
}

impl NodeDescriptor {
    pub fn new(node_type: &str, default_label: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            default_label: default_label.to_string(),
            fields: Vec::new(),
            sections: Vec::new(),
            form: Vec::new(),
            appearance: None,
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn form(mut self, entry: FormEntry) -> Self {
        self.form.push(entry);
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.appearance = Some(Appearance {
            color: color.to_string(),
        });
        self
    }

    pub fn find_field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Input widget kinds understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Connection,
    CognigyText,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "FieldParams::is_empty")]
    pub params: FieldParams,
    /// Only shown when another field holds the given value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Field {
    pub fn new(key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            default_value: None,
            params: FieldParams::default(),
            condition: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.params.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn option(mut self, label: &str, value: &str) -> Self {
        self.params.options.push(SelectOption {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn connection_type(mut self, connection_type: &str) -> Self {
        self.params.connection_type = Some(connection_type.to_string());
        self
    }

    pub fn shown_when(mut self, key: &str, value: &str) -> Self {
        self.condition = Some(Condition {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldParams {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
}

impl FieldParams {
    pub fn is_empty(&self) -> bool {
        !self.required && self.options.is_empty() && self.connection_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub key: String,
    pub value: String,
}

/// A collapsible group of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub key: String,
    pub label: String,
    pub default_collapsed: bool,
    pub fields: Vec<String>,
}

/// One row of the rendered form: a field or a section, by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "key", rename_all = "lowercase")]
pub enum FormEntry {
    Field(String),
    Section(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appearance {
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_field_omits_empty_parts() {
        let field = Field::new("url", "URL", FieldType::CognigyText);
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"key": "url", "label": "URL", "type": "cognigyText"})
        );
    }

    #[test]
    fn select_field_serializes_options_and_condition() {
        let field = Field::new("k", "Key", FieldType::Select)
            .option("One", "1")
            .required()
            .default_value("1")
            .shown_when("mode", "x");

        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "key": "k",
                "label": "Key",
                "type": "select",
                "defaultValue": "1",
                "params": {"required": true, "options": [{"label": "One", "value": "1"}]},
                "condition": {"key": "mode", "value": "x"}
            })
        );
    }

    #[test]
    fn form_entries_are_tagged() {
        let entries = vec![
            FormEntry::Field("text".into()),
            FormEntry::Section("storage".into()),
        ];
        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            json!([
                {"type": "field", "key": "text"},
                {"type": "section", "key": "storage"}
            ])
        );
    }

    #[test]
    fn descriptor_uses_host_key_names() {
        let d = NodeDescriptor::new("thing", "Do Thing").color("#fff");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["type"], "thing");
        assert_eq!(v["defaultLabel"], "Do Thing");
        assert_eq!(v["appearance"]["color"], "#fff");
        assert!(v.get("sections").is_none());
    }
}
