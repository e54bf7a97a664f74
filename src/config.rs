use clap::Parser;
use std::net::SocketAddr;

/// Auction service with automatic bidding
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "AUTOBID_LISTEN", default_value = "0.0.0.0:5050")]
    pub listen: SocketAddr,

    /// Postgres connection string; bids are kept in memory when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "AUTOBID_POOL_SIZE", default_value_t = 8)]
    pub pool_size: u32,

    /// Default tracing filter, `RUST_LOG` takes precedence
    #[arg(long, env = "AUTOBID_LOG", default_value = "autobid=info")]
    pub log_filter: String,

    /// Create a seller, a buyer and two open items on start
    #[arg(long, env = "AUTOBID_SEED_DEMO_DATA")]
    pub seed_demo_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_memory_on_5050() {
        let config = Config::try_parse_from(["autobid"]).expect("parses");
        assert_eq!(config.listen, "0.0.0.0:5050".parse().expect("addr"));
        assert_eq!(config.database_url, None);
        assert_eq!(config.pool_size, 8);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "autobid",
            "--listen",
            "127.0.0.1:8080",
            "--database-url",
            "postgres://localhost/auction",
            "--seed-demo-data",
        ])
        .expect("parses");
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/auction")
        );
        assert!(config.seed_demo_data);
    }
}
