use crate::config::StorachaConfig;
use crate::file_type::mime_for_path;
use application::command::pinning::PinningClient;
use application::error::AppError;
use async_trait::async_trait;
use log::info;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::OnceCell;

const SPACE_HEADER: &str = "x-storacha-space";

/// Client of the Storacha HTTP bridge. The authenticated session is
/// bootstrapped once per process; concurrent first requests share a
/// single bootstrap via the cell.
pub struct StorachaClient {
    http: reqwest::Client,
    cfg: StorachaConfig,
    session: OnceCell<Session>,
}

#[derive(Debug, Clone)]
struct Session {
    space_did: String,
}

#[derive(Debug, Deserialize)]
struct SpaceInfo {
    did: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

impl StorachaClient {
    pub fn new(cfg: StorachaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
            session: OnceCell::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.cfg.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn session(&self) -> Result<&Session, AppError> {
        self.session.get_or_try_init(|| self.bootstrap()).await
    }

    /// First-run flow: reuse an existing space when the account has
    /// one, otherwise log in by email and create the configured space.
    async fn bootstrap(&self) -> Result<Session, AppError> {
        let mut spaces = self.list_spaces().await.map_err(wrap_session)?;

        if spaces.is_empty() {
            if self.cfg.email.is_empty() {
                return Err(AppError::Pinning(
                    "Failed to initialize Storacha session: no space exists and no account \
                     email is configured (set STORACHA_EMAIL for first-run authentication)"
                        .to_string(),
                ));
            }
            info!("no Storacha space found, logging in as {}", self.cfg.email);
            self.login().await.map_err(wrap_session)?;
            spaces = self.list_spaces().await.map_err(wrap_session)?;
        }

        if spaces.is_empty() {
            info!("creating Storacha space '{}'", self.cfg.space_name);
            let space = self.create_space().await.map_err(wrap_session)?;
            spaces.push(space);
        }

        let space_did = spaces.remove(0).did;
        info!("using Storacha space {}", space_did);
        Ok(Session { space_did })
    }

    async fn list_spaces(&self) -> Result<Vec<SpaceInfo>, reqwest::Error> {
        self.http
            .get(self.endpoint("spaces"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn login(&self) -> Result<(), reqwest::Error> {
        self.http
            .post(self.endpoint("login"))
            .json(&serde_json::json!({ "email": self.cfg.email }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn create_space(&self) -> Result<SpaceInfo, reqwest::Error> {
        self.http
            .post(self.endpoint("spaces"))
            .json(&serde_json::json!({ "name": self.cfg.space_name }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn file_part(&self, path: &Path, name: &str) -> Result<Part, AppError> {
        let data = tokio::fs::read(path).await?;
        let part = Part::bytes(data)
            .file_name(name.to_string())
            .mime_str(mime_for_path(path))
            .map_err(|e| AppError::Pinning(e.to_string()))?;
        Ok(part)
    }

    async fn upload_form(&self, form: Form, context: &str) -> Result<String, AppError> {
        let space = self.session().await?.space_did.clone();
        let response: UploadResponse = self
            .http
            .post(self.endpoint("upload"))
            .header(SPACE_HEADER, space)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Pinning(format!("{context}: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::Pinning(format!("{context}: {e}")))?;
        Ok(response.cid)
    }
}

fn wrap_session(e: reqwest::Error) -> AppError {
    AppError::Pinning(format!("Failed to initialize Storacha session: {e}"))
}

#[async_trait]
impl PinningClient for StorachaClient {
    async fn upload_file(&self, path: &Path, name: &str) -> Result<String, AppError> {
        let part = self.file_part(path, name).await?;
        let form = Form::new().part("file", part);
        self.upload_form(form, "Failed to upload file to IPFS").await
    }

    async fn upload_directory(&self, dir: &Path) -> Result<String, AppError> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        if names.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Folder is empty: {}",
                dir.display()
            )));
        }
        names.sort();

        let mut form = Form::new();
        for name in &names {
            let part = self.file_part(&dir.join(name), name).await?;
            form = form.part("file", part);
        }
        self.upload_form(form, "Failed to upload folder to IPFS").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> StorachaClient {
        StorachaClient::new(StorachaConfig {
            email: "ops@example.com".to_string(),
            api_url: api_url.to_string(),
            space_name: "music-nft-mint".to_string(),
        })
    }

    #[test]
    fn endpoint_joins_regardless_of_slashes() {
        assert_eq!(
            client("https://up.storacha.network/bridge").endpoint("upload"),
            "https://up.storacha.network/bridge/upload"
        );
        assert_eq!(
            client("https://up.storacha.network/bridge/").endpoint("/spaces"),
            "https://up.storacha.network/bridge/spaces"
        );
    }

    #[tokio::test]
    async fn empty_directory_is_rejected_before_any_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = client("http://127.0.0.1:9")
            .upload_directory(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
