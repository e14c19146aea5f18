use std::env;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_MODEL_PATH: &str = "models/age_classifier.onnx";
const DEFAULT_MAX_UPLOAD_MIB: usize = 16;

/// Server settings, read once at startup from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub model_path: String,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        let max_upload_mib = env::var("MAX_UPLOAD_MIB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MIB);

        Self {
            port,
            model_path,
            max_upload_bytes: max_upload_mib * 1024 * 1024,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MIB * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cap_uploads_at_sixteen_mib() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.port, 8081);
        assert!(config.model_path.ends_with(".onnx"));
    }
}
