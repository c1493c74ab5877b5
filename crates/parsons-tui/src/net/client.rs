use std::path::PathBuf;

use parsons_core::protocol::{GenerateRequest, GenerateResponse};

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

fn server_url() -> String {
    std::env::var("PARSONS_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
}

fn key_file_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parsons-tui");
    config_dir.join("api-key.json")
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StoredKey {
    api_key: String,
}

/// HTTP client for the puzzle-generation service.
pub struct GenerateClient {
    http: reqwest::Client,
}

impl GenerateClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Request a generated puzzle for the given task description.
    pub async fn generate(
        &self,
        task: &str,
        api_key: Option<String>,
    ) -> Result<GenerateResponse, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/puzzle", server_url());
        let request = GenerateRequest {
            task: task.to_string(),
            api_key,
        };
        let resp = self.http.post(&url).json(&request).send().await?;
        let body = resp.json::<GenerateResponse>().await?;
        Ok(body)
    }

    /// Save the upstream API key to disk for future sessions.
    pub fn save_api_key(key: &str) -> std::io::Result<()> {
        let path = key_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = StoredKey {
            api_key: key.to_string(),
        };
        let json = serde_json::to_string(&data).unwrap();
        std::fs::write(path, json)
    }

    /// Load a previously saved API key from disk.
    pub fn load_api_key() -> Option<String> {
        let data = std::fs::read_to_string(key_file_path()).ok()?;
        let stored: StoredKey = serde_json::from_str(&data).ok()?;
        if stored.api_key.trim().is_empty() {
            None
        } else {
            Some(stored.api_key)
        }
    }
}
