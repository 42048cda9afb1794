use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub magic_link: MagicLinkConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkConfig {
    /// Frontend URL the emailed link points at; the token is appended as `?token=`
    pub base_url: String,
    pub token_ttl_seconds: i64,
    /// Link requests allowed per email inside `window_seconds`
    pub max_requests: u64,
    pub window_seconds: i64,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/auth/verify".to_string(),
            token_ttl_seconds: 900,
            max_requests: 3,
            window_seconds: 900,
        }
    }
}

/// HTTP mail API. With an empty `api_key` links are logged instead of sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailerConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub from_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// Emails promoted to admin on sign-in
    #[serde(default)]
    pub emails: Vec<String>,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // without a config file everything comes from the environment
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                let magic_defaults = MagicLinkConfig::default();

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    magic_link: MagicLinkConfig {
                        base_url: get_env("MAGIC_LINK_BASE_URL")
                            .unwrap_or(magic_defaults.base_url),
                        token_ttl_seconds: get_env_parse(
                            "MAGIC_LINK_TTL_SECONDS",
                            magic_defaults.token_ttl_seconds,
                        ),
                        max_requests: get_env_parse(
                            "MAGIC_LINK_MAX_REQUESTS",
                            magic_defaults.max_requests,
                        ),
                        window_seconds: get_env_parse(
                            "MAGIC_LINK_WINDOW_SECONDS",
                            magic_defaults.window_seconds,
                        ),
                    },
                    mailer: MailerConfig {
                        api_url: get_env("MAILER_API_URL").unwrap_or_default(),
                        api_key: get_env("MAILER_API_KEY").unwrap_or_default(),
                        from_address: get_env("MAILER_FROM_ADDRESS").unwrap_or_default(),
                    },
                    admin: AdminConfig {
                        emails: get_env("ADMIN_EMAILS")
                            .map(|v| parse_email_list(&v))
                            .unwrap_or_default(),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // environment always wins over the file
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }

        // Magic link
        if let Ok(v) = env::var("MAGIC_LINK_BASE_URL") {
            config.magic_link.base_url = v;
        }
        if let Ok(v) = env::var("MAGIC_LINK_TTL_SECONDS")
            && let Ok(n) = v.parse()
        {
            config.magic_link.token_ttl_seconds = n;
        }
        if let Ok(v) = env::var("MAGIC_LINK_MAX_REQUESTS")
            && let Ok(n) = v.parse()
        {
            config.magic_link.max_requests = n;
        }
        if let Ok(v) = env::var("MAGIC_LINK_WINDOW_SECONDS")
            && let Ok(n) = v.parse()
        {
            config.magic_link.window_seconds = n;
        }

        // Mailer
        if let Ok(v) = env::var("MAILER_API_URL") {
            config.mailer.api_url = v;
        }
        if let Ok(v) = env::var("MAILER_API_KEY") {
            config.mailer.api_key = v;
        }
        if let Ok(v) = env::var("MAILER_FROM_ADDRESS") {
            config.mailer.from_address = v;
        }

        if let Ok(v) = env::var("ADMIN_EMAILS") {
            config.admin.emails = parse_email_list(&v);
        }

        Ok(config)
    }
}

/// Comma separated list, normalized to lowercase.
fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_list() {
        assert_eq!(
            parse_email_list(" Admin@Example.org, ,ops@example.org "),
            vec!["admin@example.org".to_string(), "ops@example.org".to_string()]
        );
        assert!(parse_email_list("").is_empty());
    }

    #[test]
    fn test_optional_sections_default() {
        let raw = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "sqlite::memory:"
max_connections = 1

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120
"#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.magic_link.max_requests, 3);
        assert_eq!(config.magic_link.window_seconds, 900);
        assert!(config.mailer.api_key.is_empty());
        assert!(config.admin.emails.is_empty());
    }
}
