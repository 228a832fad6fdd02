//! Client error types

use vitrine_shared::landing::editor::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid client setup
    #[error("Configuração inválida: {0}")]
    Config(String),

    /// The API answered with an error status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 401: the session token was missing, expired or rejected
    #[error("{0}")]
    Unauthorized(String),

    #[error("Falha de comunicação com o servidor: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Resposta inválida do servidor: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the session file failed
    #[error("Falha ao acessar a sessão: {0}")]
    Session(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, message } => BackendError::Rejected { status, message },
            ClientError::Unauthorized(message) => BackendError::Rejected {
                status: 401,
                message,
            },
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_becomes_rejection() {
        let err = ClientError::Api {
            status: 409,
            message: "Este nome digital já está em uso".to_string(),
        };
        assert_eq!(err.status(), Some(409));

        assert_eq!(
            BackendError::from(err),
            BackendError::Rejected {
                status: 409,
                message: "Este nome digital já está em uso".to_string()
            }
        );
    }

    #[test]
    fn test_local_failures_are_unavailable() {
        let err = ClientError::Config("URL base vazia".to_string());
        assert!(matches!(BackendError::from(err), BackendError::Unavailable(_)));
    }
}
