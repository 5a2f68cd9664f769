// Command line and environment configuration

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use std::path::PathBuf;

use crate::auth::token::DEFAULT_JWT_SECRET;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_DATABASE: &str = "ecommerce.sqlite";
pub const DEFAULT_CATALOG_DIR: &str = "jsons";

/// Which routes sit behind the bearer-token middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteProtection {
    /// Profile, single product, categories and comments; cart and the
    /// multi-product lookup stay open
    #[default]
    CatalogAndProfile,
    /// Everything except sign-up and login
    All,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: String,
    pub catalog_dir: PathBuf,
    pub jwt_secret: Option<String>,
    pub bcrypt_cost: u32,
    pub route_protection: RouteProtection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            jwt_secret: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            route_protection: RouteProtection::default(),
        }
    }
}

impl Config {
    pub fn command() -> clap::Command {
        clap::Command::new("tienda")
            .about("Storefront backend: accounts, catalog and carts")
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .env("PORT")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .value_parser(value_parser!(u16))
                    .default_value("9000"),
            )
            .arg(
                Arg::new("database")
                    .short('d')
                    .long("database")
                    .env("TIENDA_DB")
                    .value_name("DATABASE")
                    .help("Path to SQLite database file, or :memory:")
                    .default_value(DEFAULT_DATABASE),
            )
            .arg(
                Arg::new("catalog")
                    .short('c')
                    .long("catalog")
                    .env("TIENDA_CATALOG")
                    .value_name("DIR")
                    .help("Directory holding the product, category and comment JSON files")
                    .value_parser(value_parser!(PathBuf))
                    .default_value(DEFAULT_CATALOG_DIR),
            )
            .arg(
                Arg::new("jwt_secret")
                    .long("jwt-secret")
                    .env("JWT_SECRET")
                    .value_name("SECRET")
                    .hide_env_values(true)
                    .help("Secret used to sign session tokens"),
            )
            .arg(
                Arg::new("bcrypt_cost")
                    .long("bcrypt-cost")
                    .env("BCRYPT_COST")
                    .value_name("COST")
                    .help("bcrypt work factor")
                    .value_parser(value_parser!(u32).range(4..=31))
                    .default_value("12"),
            )
            .arg(
                Arg::new("protect_all_routes")
                    .long("protect-all-routes")
                    .env("TIENDA_PROTECT_ALL_ROUTES")
                    .help("Require a bearer token on cart and multi-product routes too")
                    .action(ArgAction::SetTrue),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let port = *matches.get_one::<u16>("port").context("port has a default")?;
        let database = matches
            .get_one::<String>("database")
            .context("database has a default")?
            .clone();
        let catalog_dir = matches
            .get_one::<PathBuf>("catalog")
            .context("catalog has a default")?
            .clone();
        let jwt_secret = matches
            .get_one::<String>("jwt_secret")
            .filter(|s| !s.is_empty())
            .cloned();
        let bcrypt_cost = *matches
            .get_one::<u32>("bcrypt_cost")
            .context("bcrypt cost has a default")?;
        let route_protection = if matches.get_flag("protect_all_routes") {
            RouteProtection::All
        } else {
            RouteProtection::CatalogAndProfile
        };

        Ok(Self {
            port,
            database,
            catalog_dir,
            jwt_secret,
            bcrypt_cost,
            route_protection,
        })
    }

    pub fn from_args() -> Result<Self> {
        Self::from_matches(&Self::command().get_matches())
    }

    /// The configured secret, or the insecure development default
    pub fn jwt_secret_or_default(&self) -> &str {
        match &self.jwt_secret {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "JWT_SECRET is not set; signing tokens with the insecure development default"
                );
                DEFAULT_JWT_SECRET
            }
        }
    }
}
