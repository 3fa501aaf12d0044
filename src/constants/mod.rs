pub const USERS_COLLECTION: &str = "users";
pub const SESSIONS_COLLECTION: &str = "sessions";
pub const POSTS_COLLECTION: &str = "posts";
pub const RELATIONSHIPS_COLLECTION: &str = "relationships";
pub const BADGES_COLLECTION: &str = "badges";
pub const REPORTS_COLLECTION: &str = "reports";

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");

        // Without a database the service keeps everything in memory.
        let database_url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        Env { jwt_secret, access_token_expiration, database_url, frontend_url, ip, port, workers }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
