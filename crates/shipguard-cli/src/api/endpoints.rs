//! API endpoint URL builders

/// Build the health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

/// Build the recovery initiate URL
pub fn recovery_url(base_url: &str) -> String {
    format!("{}/api/v1/recovery", base_url)
}

/// Build the recovery process-batch URL
pub fn recovery_batches_url(base_url: &str) -> String {
    format!("{}/api/v1/recovery/batches", base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_compose_from_base() {
        assert_eq!(
            recovery_batches_url("http://localhost:8400"),
            "http://localhost:8400/api/v1/recovery/batches"
        );
        assert_eq!(health_url("http://h"), "http://h/health");
    }
}
