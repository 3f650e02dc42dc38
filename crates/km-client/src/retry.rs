use std::fmt::Display;

use km_config::RetryConfig;
use tokio::time::sleep;

/// Result of [`retry_bounded`]
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every allowed attempt failed with a retriable error
    Exhausted { error: E, attempts: u32 },
    /// First non-retriable error; no further attempts were made
    Rejected { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Rejected { attempts, .. } => *attempts,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Succeeded { value, .. } => Ok(value),
            Self::Exhausted { error, .. } | Self::Rejected { error, .. } => Err(error),
        }
    }
}

/// Run `operation` up to `config.max_attempts` times with a fixed delay.
///
/// `operation` receives the zero-based attempt index so it can vary its
/// input between attempts.
pub async fn retry_bounded<F, Fut, T, E, R>(
    config: &RetryConfig,
    operation_name: &str,
    is_retriable: R,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let delay = config.delay();
    let mut attempts = 0;

    loop {
        let attempt = attempts;
        attempts += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempts > 1 {
                    log::info!("{} succeeded after {} attempts", operation_name, attempts);
                }
                return RetryOutcome::Succeeded { value, attempts };
            }
            Err(error) if !is_retriable(&error) => {
                log::warn!("{} failed: {}", operation_name, error);
                return RetryOutcome::Rejected { error, attempts };
            }
            Err(error) if attempts >= max_attempts => {
                log::warn!(
                    "{} failed after {} attempts: {}",
                    operation_name,
                    attempts,
                    error
                );
                return RetryOutcome::Exhausted { error, attempts };
            }
            Err(error) => {
                log::debug!(
                    "{} attempt {} failed: {}. Retrying in {:?}",
                    operation_name,
                    attempts,
                    error,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
