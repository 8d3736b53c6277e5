use super::parsing::{
    env_first, env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_positive_i64, parse_timestamp, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, DrawSettings,
    PaginationSettings, RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("FORTUNA_HOST", "0.0.0.0");
        let port = env_first(&["FORTUNA_PORT", "SRV_PORT"]).unwrap_or_else(|| "8080".to_string());

        let environment = parse_environment(env_first(&["FORTUNA_ENV", "SRV_MODE"]));
        let strict_config =
            env_optional("FORTUNA_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Fortuna API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let explicit_secret = env_first(&["SECRET_KEY", "SRV_JWT_SECRET_KEY"]);
        let secret_key_from_env = explicit_secret.is_some();
        let secret_key = match explicit_secret {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_first(&["ACCESS_TOKEN_EXPIRE_MINUTES", "SRV_JWT_TOKEN_EXP"])
                .unwrap_or_else(|| "15".to_string()),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "fortuna");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "fortuna_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u32(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "20"),
        )?;

        let redis_host =
            env_first(&["REDIS_HOST", "SRV_RDB_HOST"]).unwrap_or_else(|| "localhost".to_string());
        let redis_port = parse_u16(
            "REDIS_PORT",
            env_first(&["REDIS_PORT", "SRV_RDB_PORT"]).unwrap_or_else(|| "6379".to_string()),
        )?;
        let redis_db = parse_u16(
            "REDIS_DB",
            env_first(&["REDIS_DB", "SRV_R_DB"]).unwrap_or_else(|| "0".to_string()),
        )?;
        let redis_password = env_first(&["REDIS_PASSWORD", "SRV_R_PASS"]).unwrap_or_default();

        let default_limit = parse_positive_i64(
            "PAGINATION_DEFAULT_LIMIT",
            env_or_default("PAGINATION_DEFAULT_LIMIT", "10"),
        )?;
        let max_limit = env_optional("PAGINATION_MAX_LIMIT")
            .map(|value| parse_positive_i64("PAGINATION_MAX_LIMIT", value))
            .transpose()?;

        let window_start = parse_timestamp(
            "DRAW_WINDOW_START",
            env_first(&["DRAW_WINDOW_START", "SRV_DATA_INICIAL"]),
        )?;
        let window_end =
            parse_timestamp("DRAW_WINDOW_END", env_first(&["DRAW_WINDOW_END", "SRV_DATA_FINAL"]))?;

        let first_superuser_email = env_or_default("FIRST_SUPERUSER_EMAIL", "admin@fortuna.local");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("FORTUNA_LOG_LEVEL", "info");
        let json = env_optional("FORTUNA_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            pagination: PaginationSettings { default_limit, max_limit },
            draws: DrawSettings { window_start, window_end },
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate(secret_key_from_env)?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn pagination(&self) -> &PaginationSettings {
        &self.pagination
    }

    pub(crate) fn draws(&self) -> &DrawSettings {
        &self.draws
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self, secret_key_from_env: bool) -> Result<(), ConfigError> {
        if let Some(max_limit) = self.pagination.max_limit {
            if self.pagination.default_limit > max_limit {
                return Err(ConfigError::InvalidValue {
                    field: "PAGINATION_DEFAULT_LIMIT",
                    value: format!(
                        "{} exceeds PAGINATION_MAX_LIMIT {max_limit}",
                        self.pagination.default_limit
                    ),
                });
            }
        }

        if let (Some(start), Some(end)) = (self.draws.window_start, self.draws.window_end) {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    field: "DRAW_WINDOW_END",
                    value: String::from("window ends before it starts"),
                });
            }
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        if !secret_key_from_env {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}
