use std::path::PathBuf;

/// Runtime configuration, read once at startup. Missing required variables
/// abort the process before anything binds or connects.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub file_directory: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        // No fallback secret: refusing to start beats signing with a default
        let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let file_directory = std::env::var("FILE_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        Config {
            database_url,
            jwt_secret,
            bind_addr,
            file_directory,
        }
    }
}
