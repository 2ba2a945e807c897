//! Configuração do cutout carregada a partir de `cutout.toml`.
//!
//! A struct [`CutoutConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults para desenvolvimento local.
//! As variáveis de ambiente `CUTOUT_API_URL` e `CUTOUT_API_KEY` têm
//! precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::CutoutError;
use crate::validator::{DEFAULT_MAX_FILE_SIZE, TypePolicy, ValidationPolicy};

pub const CONFIG_FILE: &str = "cutout.toml";
pub const API_URL_ENV: &str = "CUTOUT_API_URL";
pub const API_KEY_ENV: &str = "CUTOUT_API_KEY";

/// Configuração de nível superior carregada de `cutout.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CutoutConfig {
    /// URL do endpoint de remoção de fundo.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chave enviada no cabeçalho `x-api-key`.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Tamanho máximo aceito, em bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Política de tipos aceitos: `prefix` (qualquer `image/*`) ou `allow-list`.
    #[serde(default)]
    pub type_policy: TypePolicy,

    /// Tempo máximo de espera por uma submissão, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Tempo máximo para estabelecer a conexão, em segundos.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

// Servidor local do backend FastAPI.
fn default_api_url() -> String {
    "http://127.0.0.1:8000/remove-bg".to_string()
}

// Chave de desenvolvimento local; substitua via CUTOUT_API_KEY.
fn default_api_key() -> String {
    "mysecretkey123".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for CutoutConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: default_api_key(),
            max_file_size: default_max_file_size(),
            type_policy: TypePolicy::default(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl CutoutConfig {
    /// Carrega a configuração de `cutout.toml` no diretório atual e aplica
    /// as variáveis de ambiente.
    pub fn load() -> Result<Self, CutoutError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Carrega de um caminho específico. Usa valores padrão se o arquivo não existir.
    pub fn load_from(path: &Path) -> Result<Self, CutoutError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<CutoutConfig>(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Variáveis de ambiente têm precedência sobre o arquivo. Valores vazios são ignorados.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV)
            && !url.is_empty()
        {
            self.api_url = url;
        }
        if let Some(key) = lookup(API_KEY_ENV)
            && !key.is_empty()
        {
            self.api_key = key;
        }
    }

    /// Verifica invariantes básicos. Deve ser chamado de novo depois de
    /// sobrescrever campos (flags da CLI, por exemplo).
    pub fn validate(&self) -> Result<(), CutoutError> {
        if self.api_url.trim().is_empty() {
            return Err(CutoutError::Config("api_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CutoutError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            max_file_size: self.max_file_size,
            type_policy: self.type_policy,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
