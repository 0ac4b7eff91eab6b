use serde_json::Value;

/// The `errors` member of a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Errors {
    Scalar(String),
    /// Messages per form field, in the order the backend sent them.
    FieldErrors(Vec<(String, Vec<String>)>),
}

impl Errors {
    /// Decodes an `errors` value, `None` when it is falsy.
    pub fn from_value(value: Value) -> Option<Self> {
        if !is_truthy(&value) {
            return None;
        }

        let errors = match value {
            Value::Object(fields) => Self::FieldErrors(
                fields
                    .into_iter()
                    .map(|(field, messages)| (field, into_messages(messages)))
                    .collect(),
            ),
            Value::Array(entries) => Self::FieldErrors(
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, messages)| (i.to_string(), into_messages(messages)))
                    .collect(),
            ),
            scalar => Self::Scalar(into_text(scalar)),
        };
        Some(errors)
    }

    /// The first message of every field joined by newlines, or the scalar as is.
    ///
    /// `None` when there is nothing to show.
    pub fn compose(&self) -> Option<String> {
        match self {
            Self::Scalar(message) => Some(message.clone()),
            Self::FieldErrors(fields) => {
                let firsts: Vec<&str> = fields
                    .iter()
                    .filter_map(|(_, messages)| messages.first())
                    .map(String::as_str)
                    .collect();
                if firsts.is_empty() {
                    None
                } else {
                    Some(firsts.join("\n"))
                }
            }
        }
    }
}

/// Reply to an intercepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResponse {
    Accepted {
        username: Option<String>,
        redirect_url: Option<String>,
    },
    Rejected {
        errors: Option<Errors>,
    },
}

impl SubmitResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Value>(body).map(Self::from)
    }
}

impl From<Value> for SubmitResponse {
    fn from(value: Value) -> Self {
        let Value::Object(mut body) = value else {
            return Self::Rejected { errors: None };
        };

        if body.get("success").is_some_and(is_truthy) {
            Self::Accepted {
                username: body.remove("username").and_then(non_empty_text),
                redirect_url: body.remove("redirect_url").and_then(non_empty_text),
            }
        } else {
            Self::Rejected {
                errors: body.remove("errors").and_then(Errors::from_value),
            }
        }
    }
}

/// `false`, `null`, `0` and `""` are falsy, everything else is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn into_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn non_empty_text(value: Value) -> Option<String> {
    is_truthy(&value).then(|| into_text(value))
}

fn into_messages(value: Value) -> Vec<String> {
    match value {
        Value::Array(messages) => messages.into_iter().map(into_text).collect(),
        Value::Null => Vec::new(),
        message => vec![into_text(message)],
    }
}
