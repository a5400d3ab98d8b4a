use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received at all.
    #[error("falha de conexão: {0}")]
    Transport(String),

    /// A response arrived with a failing status.
    #[error("{detail}")]
    Status { status: u16, detail: String },

    #[error("payload inválido: {0}")]
    Payload(String),

    #[error("configuração inválida: {0}")]
    Config(String),

    #[error("prévia indisponível: {0}")]
    Preview(String),

    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
