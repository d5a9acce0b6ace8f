use std::time::Duration;

use crate::designer::error::DesignerError;

/// Bounded retry with growing delay, for content the host renders late.
///
/// The page builds its grid asynchronously, so a scan right after navigation
/// often sees nothing. Rather than observing mutations, callers poll through
/// this policy: a fixed number of attempts with a delay that grows by half
/// each round, stopping at the first attempt that produces a value.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Run `attempt` until it yields a value or the policy is exhausted.
///
/// `Ok(None)` from `attempt` means "not there yet"; errors propagate
/// immediately. Returns `Ok(None)` when every attempt came up empty.
pub fn retry_until<T>(
    policy: RetryPolicy,
    mut attempt: impl FnMut() -> Result<Option<T>, DesignerError>,
) -> Result<Option<T>, DesignerError> {
    let mut delay = policy.initial_delay;

    for round in 0..policy.max_attempts {
        if let Some(found) = attempt()? {
            return Ok(Some(found));
        }
        // No sleep after the final attempt
        if round + 1 < policy.max_attempts {
            std::thread::sleep(delay);
            delay = (delay + delay / 2).min(policy.max_delay);
        }
    }

    Ok(None)
}
