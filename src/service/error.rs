//! Tipos de erro para o cliente do serviço de remoção de fundo.
//!
//! Define [`ApiError`] com uma variante por classe de resposta do serviço.
//! Usa `thiserror` para derivar `Display` e `Error` automaticamente a partir
//! dos atributos `#[error(...)]`.

use thiserror::Error;

use crate::error::WorkflowError;

/// Erros que podem ocorrer ao chamar o serviço de remoção de fundo.
///
/// As variantes são mutuamente exclusivas e cobrem todo o espaço de respostas:
/// - [`Network`](ApiError::Network): o serviço não pôde ser alcançado
/// - [`Timeout`](ApiError::Timeout): o limite de tempo do cliente HTTP expirou
/// - [`InvalidCredential`](ApiError::InvalidCredential): HTTP 401/403
/// - [`InvalidImage`](ApiError::InvalidImage): HTTP 400
/// - [`Status`](ApiError::Status): qualquer outro erro HTTP (4xx/5xx)
#[derive(Debug, Error)]
pub enum ApiError {
    /// Falha de rede subjacente (DNS, conexão recusada, corpo interrompido).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// O cliente HTTP desistiu de esperar pela resposta.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// O serviço rejeitou a chave de API.
    #[error("invalid API key: {message}")]
    InvalidCredential { message: String },

    /// O serviço rejeitou o payload como imagem inválida.
    #[error("invalid image: {message}")]
    InvalidImage { message: String },

    /// Qualquer outro status que não seja sucesso.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// A URL configurada do serviço não pôde ser interpretada.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(e) => WorkflowError::ServiceUnreachable(e.to_string()),
            ApiError::InvalidEndpoint { .. } => WorkflowError::ServiceUnreachable(err.to_string()),
            ApiError::Timeout { secs } => WorkflowError::Timeout { secs },
            ApiError::InvalidCredential { .. } => WorkflowError::InvalidCredential,
            ApiError::InvalidImage { message } => WorkflowError::InvalidImage(message),
            ApiError::Status { status, message } => WorkflowError::ServiceError { status, message },
        }
    }
}
