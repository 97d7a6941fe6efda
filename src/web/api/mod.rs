pub mod convert;
pub mod error;
pub mod history;

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use axum::response::Response;

    use crate::run::scratch_dir;
    use crate::web::config::{Config, StorageConfig};
    use crate::web::server::AppState;

    /// State whose artifacts all live in a fresh scratch directory.
    pub fn test_state(tag: &str) -> (AppState, PathBuf) {
        let dir = scratch_dir(tag);
        let config = Config {
            storage: StorageConfig {
                tles_dir: dir.join("tles"),
                output_dir: dir.clone(),
                pass_results: dir.join("res.json"),
                frontend_config: dir.join("frontendConfig.json"),
            },
            ..Default::default()
        };
        (AppState::new(config), dir)
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
