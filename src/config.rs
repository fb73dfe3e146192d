use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitpower".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitpower-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            jwt,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        std::env::set_var("FITPOWER_TEST_PORT", "not-a-port");
        assert_eq!(env_or::<u16>("FITPOWER_TEST_PORT", 8080), 8080);
        std::env::set_var("FITPOWER_TEST_PORT", "9090");
        assert_eq!(env_or::<u16>("FITPOWER_TEST_PORT", 8080), 9090);
        std::env::remove_var("FITPOWER_TEST_PORT");
    }
}
