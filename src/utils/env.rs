// src/utils/env.rs

use log::debug;

/// Best-effort .env loading; a missing file is not an error
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment"),
    }
}
