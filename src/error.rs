use thiserror::Error;

/// Everything a render pass can fail with. Each variant is shown to the user
/// as-is; none of them terminate the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("failed to fetch price data: {0}")]
    FetchFailed(String),
    #[error("no price data available: {0}")]
    EmptyResult(String),
    #[error("select at least one company")]
    NoSelection,
    #[error("invalid parameter: {0}")]
    PreconditionViolation(String),
}

/// Failures raised by a market-data provider before they reach the pipeline.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider api error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<ProviderError> for DashboardError {
    fn from(err: ProviderError) -> Self {
        DashboardError::FetchFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_become_fetch_failures() {
        let err: DashboardError = ProviderError::Api("Not Found".to_string()).into();
        assert_eq!(
            err,
            DashboardError::FetchFailed("provider api error: Not Found".to_string())
        );
    }

    #[test]
    fn messages_are_distinguishable() {
        let messages = [
            DashboardError::FetchFailed("timeout".into()).to_string(),
            DashboardError::EmptyResult("AAPL".into()).to_string(),
            DashboardError::NoSelection.to_string(),
            DashboardError::PreconditionViolation("day count 0".into()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
