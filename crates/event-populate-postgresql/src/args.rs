//! CLI argument definitions for the PostgreSQL backend.

use clap::Args;

/// PostgreSQL connection parameters, each also readable from the environment.
#[derive(Args, Clone, Debug)]
pub struct PostgreSQLArgs {
    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "analytics_db")]
    pub db_name: String,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "analytics_user")]
    pub db_user: String,

    /// Database password
    #[arg(
        long,
        env = "DB_PASSWORD",
        default_value = "secure_password",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub db_password: String,
}

impl PostgreSQLArgs {
    pub fn to_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.db_host)
            .port(self.db_port)
            .dbname(&self.db_name)
            .user(&self.db_user)
            .password(&self.db_password);
        config
    }

    /// Connection target for log messages; never includes the password.
    pub fn endpoint(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{}",
            self.db_user, self.db_host, self.db_port, self.db_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        pg: PostgreSQLArgs,
    }

    #[test]
    fn test_explicit_flags() {
        let cli = TestCli::parse_from([
            "seed",
            "--db-host",
            "db.internal",
            "--db-port",
            "6543",
            "--db-name",
            "seeded",
            "--db-user",
            "loader",
            "--db-password",
            "hunter2",
        ]);
        let config = cli.pg.to_config();

        assert_eq!(config.get_dbname(), Some("seeded"));
        assert_eq!(config.get_user(), Some("loader"));
        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_password(), Some("hunter2".as_bytes()));
        assert_eq!(cli.pg.endpoint(), "postgresql://loader@db.internal:6543/seeded");
    }

    #[test]
    fn test_endpoint_hides_password() {
        let cli = TestCli::parse_from(["seed", "--db-password", "hunter2"]);
        assert!(!cli.pg.endpoint().contains("hunter2"));
    }
}
