//! Server configuration from command-line flags and environment.

use std::net::SocketAddr;

use clap::Parser;
use lokal_core::plan::Plan;
use lokal_db::DbConfig;
use lokal_entitlements::EntitlementsConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "lokal-server")]
#[command(version)]
#[command(about = "Lokal directory platform API", long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "LOKAL_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// SurrealDB WebSocket endpoint
    #[arg(long, env = "LOKAL_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "LOKAL_DB_NAMESPACE", default_value = "lokal")]
    pub db_namespace: String,

    #[arg(long, env = "LOKAL_DB_DATABASE", default_value = "directory")]
    pub db_database: String,

    #[arg(long, env = "LOKAL_DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "LOKAL_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,

    /// Site served when a request carries no site key
    #[arg(long, env = "DEFAULT_SITE_SLUG")]
    pub default_site_slug: Option<String>,

    /// Legacy name of DEFAULT_SITE_SLUG
    #[arg(long, env = "DEFAULT_TENANT_SLUG", hide = true)]
    pub default_tenant_slug: Option<String>,

    /// Plan assumed for sites without a subscription
    #[arg(long, env = "LOKAL_DEFAULT_PLAN", default_value = "BASIC")]
    pub default_plan: Plan,
}

impl Config {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn entitlements_config(&self) -> EntitlementsConfig {
        EntitlementsConfig {
            default_plan: self.default_plan,
            default_site_slug: self
                .default_site_slug
                .clone()
                .or_else(|| self.default_tenant_slug.clone()),
            ..Default::default()
        }
    }
}
