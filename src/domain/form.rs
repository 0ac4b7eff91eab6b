use std::borrow::Borrow;

use derive_more::Display;

/// Element id of a form registered for interception.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct FormId(String);

impl TryFrom<String> for FormId {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("form id is empty".into());
        }

        if value.chars().any(char::is_whitespace) {
            return Err("form id contains whitespace".into());
        }

        Ok(Self(value))
    }
}

impl Borrow<str> for FormId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Snapshot of a form element at the time it was submitted.
#[derive(Debug, Clone, Default)]
pub struct FormElement {
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub action: Option<String>,
    pub fields: Vec<(String, FieldValue)>,
}

impl FormElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_list.push(class.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), FieldValue::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FieldValue::File {
                file_name: file_name.into(),
                mime: mime.map(str::to_owned),
                bytes,
            },
        ));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.iter().any(|c| c == class)
    }

    /// Fields that take part in a submission: unnamed controls are left out.
    pub fn named_fields(&self) -> impl Iterator<Item = &(String, FieldValue)> {
        self.fields.iter().filter(|(name, _)| !name.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct SubmitEvent {
    pub target: FormElement,
}

impl SubmitEvent {
    pub fn new(target: FormElement) -> Self {
        Self { target }
    }
}
