use std::env;
use std::net::{IpAddr, SocketAddr};
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The minimum length, in bytes, of the token signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Argon2id cost parameters used when hashing new passwords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 3,
            parallelism: 6,
        }
    }
}

/// Per-IP rate limit applied to the register and login routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Seconds needed to replenish one request.
    pub per_second: u64,
    /// Requests allowed in a burst.
    pub burst: u32,
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database, or `memory://` for the in-process store.
    pub database_url: String,
    /// The secret used to sign session tokens.
    pub jwt_secret: Zeroizing<String>,
    /// The address the server binds to.
    pub bind_addr: SocketAddr,
    /// The validity window of a session token in days.
    pub token_ttl_days: i64,
    /// Password hashing cost.
    pub hash_params: HashParams,
    /// Rate limit for unauthenticated auth routes. `None` disables it.
    pub rate_limit: Option<RateLimit>,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` is missing, or when the
    /// secret is shorter than [`MIN_JWT_SECRET_LEN`].
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a `Config` from any key lookup, with the same rules as
    /// [`Config::from_env`].
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = Zeroizing::new(
            var("JWT_SECRET")
                .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?,
        );

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
        }

        let host: IpAddr = var("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;
        let port: u16 = var("PORT")
            .unwrap_or_else(|| "4000".to_string())
            .parse()
            .context("Invalid PORT")?;

        let per_second: u64 = var("RATE_LIMIT_PER_SECOND")
            .unwrap_or_else(|| "2".to_string())
            .parse()
            .context("Invalid RATE_LIMIT_PER_SECOND")?;
        let burst: u32 = var("RATE_LIMIT_BURST")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("Invalid RATE_LIMIT_BURST")?;
        let rate_limit = (per_second > 0 && burst > 0).then_some(RateLimit { per_second, burst });

        let defaults = HashParams::default();
        let hash_params = HashParams {
            memory_kib: parse_or(&var, "HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&var, "HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&var, "HASH_PARALLELISM", defaults.parallelism)?,
        };

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| {
                "http://localhost:3000,http://localhost:8081,http://localhost:19006".to_string()
            })
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            jwt_secret,
            bind_addr: SocketAddr::new(host, port),
            token_ttl_days: parse_or(&var, "TOKEN_TTL_DAYS", 7)?,
            hash_params,
            rate_limit,
            cors_origins,
        })
    }

    /// Whether the in-process account store was requested.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid {key}")),
        None => Ok(default),
    }
}
