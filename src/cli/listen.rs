//! Listen command implementation

use crate::config::Config;
use crate::Admin;
use clap::Args;
use serde_json::json;

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Resource to subscribe to (e.g. "users")
    #[arg(short, long)]
    pub resource: Option<String>,

    /// Event types to print, comma separated (e.g. "user.created,user.deleted")
    #[arg(short, long, value_delimiter = ',')]
    pub events: Vec<String>,
}

impl ListenArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let admin = Admin::new(config.admin.secret_key.clone(), config.admin_options())?;

        for event in &self.events {
            let name = event.clone();
            admin
                .on(event.clone(), move |data| {
                    println!("{name} {data}");
                })
                .await;
        }

        admin.connect().await?;
        tracing::info!(url = %admin.options().ws_url, "Listening for admin events");

        if let Some(resource) = &self.resource {
            admin
                .subscribe(&json!({ "resource": resource, "events": self.events }))
                .await?;
            tracing::info!(resource = %resource, events = ?self.events, "Subscribed");
        }

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
        admin.disconnect().await;

        Ok(())
    }
}
