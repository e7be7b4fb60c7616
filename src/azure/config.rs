pub const DEFAULT_BASE_URL: &str = "https://management.azure.com/";

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub subscription: String,
    pub resource_group: String,
    /// Azure Resource Manager bearer token, or `@path` to a file holding one.
    pub access_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: url::Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> url::Url {
    url::Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn default_timeout_secs() -> u64 {
    30
}
