use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("Protobuf decoding error: {0}")]
    Decode(#[from] prost::DecodeError),
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Invalid parameter {param}: {reason}")]
    Invalid { param: &'static str, reason: String },

    #[error("Failed to read params file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse params: {0}")]
    Parse(#[from] serde_json::Error),
}
