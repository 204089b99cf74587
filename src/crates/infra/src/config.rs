use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// Server configuration
    server: RawServerConfig,
    /// Storacha account and endpoint configuration
    storacha: RawStorachaConfig,
    /// Gateway bases used when deriving HTTPS URLs
    gateway: RawGatewayConfig,
    /// Upload handling configuration
    upload: RawUploadConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            server: RawServerConfig::default(),
            storacha: RawStorachaConfig::default(),
            gateway: RawGatewayConfig::default(),
            upload: RawUploadConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawServerConfig {
    /// Listen address
    host: String,
    /// Listen port
    port: u16,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawStorachaConfig {
    /// Account email, required only for first-run authentication
    email: String,
    /// HTTP bridge base URL
    api_url: String,
    /// Space created on first run when the account has none
    space_name: String,
}

impl Default for RawStorachaConfig {
    fn default() -> Self {
        Self {
            email: "".to_string(),
            api_url: "https://up.storacha.network/bridge".to_string(),
            space_name: "music-nft-mint".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawGatewayConfig {
    /// Gateway base for upload results
    upload_base: String,
    /// Gateway base for mint preparation
    mint_base: String,
}

impl Default for RawGatewayConfig {
    fn default() -> Self {
        Self {
            upload_base: "https://w3s.link/ipfs/".to_string(),
            mint_base: "https://ipfs.io/ipfs/".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawUploadConfig {
    /// Per-file size ceiling in bytes
    max_file_size: usize,
    /// Base URL used for generated external links
    public_base_url: String,
    /// Staging directory; empty means the system temp directory
    staging_dir: String,
}

impl Default for RawUploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
            public_base_url: "http://localhost:3000".to_string(),
            staging_dir: "".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorachaConfig {
    pub email: String,
    pub api_url: String,
    pub space_name: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub upload_base: String,
    pub mint_base: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub public_base_url: String,
    pub staging_dir: String,
}

impl UploadConfig {
    /// Resolved staging root; falls back to the system temp directory.
    pub fn staging_root(&self) -> PathBuf {
        if self.staging_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.staging_dir)
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    pub server: Arc<RwLock<ServerConfig>>,
    pub storacha: Arc<RwLock<StorachaConfig>>,
    pub gateway: Arc<RwLock<GatewayConfig>>,
    pub upload: Arc<RwLock<UploadConfig>>,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        let server_config = ServerConfig {
            host: data.server.host,
            port: data.server.port,
        };
        let mut storacha_config = StorachaConfig {
            email: data.storacha.email,
            api_url: data.storacha.api_url,
            space_name: data.storacha.space_name,
        };
        // STORACHA_EMAIL keeps working as a bare env var, without the
        // APP__ prefix, since deployments set it that way.
        if storacha_config.email.is_empty() {
            if let Ok(email) = std::env::var("STORACHA_EMAIL") {
                storacha_config.email = email;
            }
        }
        let gateway_config = GatewayConfig {
            upload_base: data.gateway.upload_base,
            mint_base: data.gateway.mint_base,
        };
        let upload_config = UploadConfig {
            max_file_size: data.upload.max_file_size,
            public_base_url: data.upload.public_base_url,
            staging_dir: data.upload.staging_dir,
        };
        AppConfigImpl {
            server: Arc::new(RwLock::new(server_config)),
            storacha: Arc::new(RwLock::new(storacha_config)),
            gateway: Arc::new(RwLock::new(gateway_config)),
            upload: Arc::new(RwLock::new(upload_config)),
        }
    }

    pub fn load() -> Result<AppConfigImpl, Box<dyn Error>> {
        dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let raw: RawConfig = config.try_deserialize()?;
        let app_config = AppConfigImpl::new(raw);
        Ok(app_config)
    }

    pub fn server(&self) -> ServerConfig {
        let cfg_val = self.server.read().unwrap();
        cfg_val.clone()
    }

    pub fn storacha(&self) -> StorachaConfig {
        let cfg_val = self.storacha.read().unwrap();
        cfg_val.clone()
    }

    pub fn gateway(&self) -> GatewayConfig {
        let cfg_val = self.gateway.read().unwrap();
        cfg_val.clone()
    }

    pub fn upload(&self) -> UploadConfig {
        let cfg_val = self.upload.read().unwrap();
        cfg_val.clone()
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let cfg = AppConfigImpl::default();
        assert_eq!(cfg.server().port, 3000);
        assert_eq!(cfg.gateway().upload_base, "https://w3s.link/ipfs/");
        assert_eq!(cfg.gateway().mint_base, "https://ipfs.io/ipfs/");
        assert_eq!(cfg.upload().max_file_size, 100 * 1024 * 1024);
        assert_eq!(cfg.storacha().space_name, "music-nft-mint");
    }

    #[test]
    fn empty_staging_dir_falls_back_to_temp() {
        let cfg = AppConfigImpl::default();
        assert_eq!(cfg.upload().staging_root(), std::env::temp_dir());
    }
}
