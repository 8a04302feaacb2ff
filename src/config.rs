/// Where image payloads are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Account created at startup when no user with this email exists yet.
#[derive(Debug, Clone)]
pub struct DefaultUserConfig {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub s3: Option<S3Config>,
    pub max_upload_bytes: usize,
    pub default_user: DefaultUserConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let storage_backend = match env_or("STORAGE_BACKEND", "s3").to_lowercase().as_str() {
            "s3" | "minio" => StorageBackend::S3,
            "memory" => StorageBackend::Memory,
            other => anyhow::bail!("unknown STORAGE_BACKEND {:?}", other),
        };

        let s3 = match storage_backend {
            StorageBackend::S3 => Some(S3Config {
                endpoint: std::env::var("MINIO_ENDPOINT")?,
                bucket: std::env::var("MINIO_BUCKET")?,
                access_key: std::env::var("MINIO_ACCESS_KEY")?,
                secret_key: std::env::var("MINIO_SECRET_KEY")?,
                region: env_or("MINIO_REGION", "us-east-1"),
            }),
            StorageBackend::Memory => None,
        };

        let default_user = DefaultUserConfig {
            email: env_or("DEFAULT_USER_EMAIL", "user@email.com"),
            password: env_or("DEFAULT_USER_PASSWORD", "password"),
            first_name: env_or("DEFAULT_USER_FIRST_NAME", "Firstname"),
            last_name: env_or("DEFAULT_USER_LAST_NAME", "Lastname"),
            phone: env_or("DEFAULT_USER_PHONE", "+79999999999"),
        };

        Ok(Self {
            database_url,
            host: env_or("APP_HOST", "0.0.0.0"),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            storage_backend,
            s3,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20 * 1024 * 1024),
            default_user,
        })
    }
}
