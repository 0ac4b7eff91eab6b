use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub log_level: String,
    pub backend: BackendSettings,
    pub interceptor: InterceptorSettings,
    pub feed: FeedSettings,
    pub messages: MessageSettings,
}

#[derive(Clone, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_milliseconds: u64,
    pub csrf_cookie: String,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Clone, Deserialize)]
pub struct InterceptorSettings {
    pub marker_class: String,
    #[serde(default = "default_prevent_double_submit")]
    pub prevent_double_submit: bool,
    #[serde(default)]
    pub forms: Vec<FormSettings>,
}

fn default_prevent_double_submit() -> bool {
    true
}

/// One registered form, keyed by its element id.
#[derive(Clone, Deserialize)]
pub struct FormSettings {
    pub id: String,
    pub action: Option<String>,
    pub on_success: SuccessPolicy,
}

/// Where the page goes after the backend accepted a submission.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Navigate to a fixed route.
    Redirect(String),
    /// Reload the current page in place.
    Reload,
    /// Navigate to the `redirect_url` sent by the backend, else to the fallback.
    Follow(String),
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        Self::Redirect("/".to_owned())
    }
}

#[derive(Clone, Deserialize)]
pub struct FeedSettings {
    pub path: String,
    pub container_id: String,
}

#[derive(Clone, Deserialize)]
pub struct MessageSettings {
    pub success_prefix: String,
    pub error_prefix: String,
    pub generic_error: String,
    pub connectivity_error: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
