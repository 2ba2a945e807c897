//! Tipos de dados para requisições e respostas do serviço de remoção de fundo.
//!
//! O corpo da requisição é JSON (`{"image": "<base64>"}`); a resposta de
//! sucesso é a imagem binária, e as respostas de erro seguem o formato
//! `{"detail": ...}` do FastAPI.

use serde::{Deserialize, Serialize};

use crate::resources::strip_data_url_prefix;

/// Corpo da requisição `POST` para o endpoint de remoção de fundo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalRequest {
    /// Bytes da imagem em base64, sem prefixo `data:...;base64,`.
    pub image: String,
}

impl RemovalRequest {
    /// Monta a requisição garantindo que nenhum cabeçalho de data URL
    /// chegue ao serviço.
    pub fn new(payload: &str) -> Self {
        Self {
            image: strip_data_url_prefix(payload).to_string(),
        }
    }
}

/// Imagem processada devolvida pelo serviço.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedImage {
    /// Bytes brutos da resposta.
    pub bytes: Vec<u8>,
    /// Valor do cabeçalho `content-type` (padrão `image/png`).
    pub media_type: String,
}

/// Corpo de erro no formato do FastAPI. `detail` pode ser texto ou uma
/// lista de erros de validação.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Mensagem legível extraída de `detail`.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Resposta do endpoint `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_single_image_field() {
        let req = RemovalRequest::new("iVBORw0KGgo=");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"image":"iVBORw0KGgo="}"#);
    }

    #[test]
    fn request_drops_data_url_header() {
        let req = RemovalRequest::new("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(req.image, "iVBORw0KGgo=");
    }

    #[test]
    fn error_body_string_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Invalid API Key"}"#).unwrap();
        assert_eq!(body.message(), "Invalid API Key");
    }

    #[test]
    fn error_body_validation_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["body", "image"], "msg": "field required"}]}"#)
                .unwrap();
        assert!(body.message().contains("field required"));
    }

    #[test]
    fn health_response_deserialize_from_api_format() {
        let json = r#"{"status": "healthy", "service": "Background Remover API", "version": "1.0.0"}"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "1.0.0");
    }
}
