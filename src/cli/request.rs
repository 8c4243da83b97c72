//! Request command implementation

use crate::config::Config;
use crate::Admin;
use clap::Args;
use reqwest::Method;
use serde_json::Value;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Path relative to the API URL (e.g. "/api/users")
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,
}

impl RequestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())?;
        let body: Option<Value> = self
            .body
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()?;

        let admin = Admin::new(config.admin.secret_key.clone(), config.admin_options())?;
        let response = admin
            .http()
            .request(method, &self.path, body.as_ref())
            .await?;

        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
