//! Per-call request context: the acting user and the store deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::debug;

use super::error::Error;
use super::user::Username;

/// Point in time by which every store call of a request must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; store calls may take as long as the store needs.
    pub const fn none() -> Self {
        Self(None)
    }

    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    /// Deadline at a fixed instant.
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn instant(self) -> Option<Instant> {
        self.0
    }

    pub fn is_expired(self) -> bool {
        self.0.is_some_and(|instant| Instant::now() >= instant)
    }
}

/// Identity and deadline passed explicitly to every engine operation.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use noteshare::domain::{RequestContext, Username};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ctx = RequestContext::with_timeout(
///     Username::new("alice").expect("valid username"),
///     Duration::from_secs(5),
/// );
/// assert_eq!(ctx.actor().as_ref(), "alice");
/// assert!(!ctx.deadline().is_expired());
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: Username,
    deadline: Deadline,
}

impl RequestContext {
    pub fn new(actor: Username, deadline: Deadline) -> Self {
        Self { actor, deadline }
    }

    /// Context without a deadline.
    pub fn unbounded(actor: Username) -> Self {
        Self::new(actor, Deadline::none())
    }

    /// Context whose deadline is `budget` from now.
    pub fn with_timeout(actor: Username, budget: Duration) -> Self {
        Self::new(actor, Deadline::after(budget))
    }

    /// The user on whose behalf the call runs.
    pub fn actor(&self) -> &Username {
        &self.actor
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }
}

/// Await `call`, failing with a store timeout once `deadline` passes.
pub(crate) async fn within_deadline<F>(
    deadline: Deadline,
    operation: &'static str,
    call: F,
) -> Result<F::Output, Error>
where
    F: Future,
{
    let Some(instant) = deadline.instant() else {
        return Ok(call.await);
    };
    timeout_at(instant, call).await.map_err(|_| {
        debug!(operation, "store call exceeded its deadline");
        Error::store_timeout(operation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_deadline_is_unbounded() {
        assert_eq!(Deadline::default(), Deadline::none());
        assert!(!Deadline::none().is_expired());
    }

    #[tokio::test]
    async fn completes_within_generous_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let value = within_deadline(deadline, "lookup", async { 7 })
            .await
            .expect("call completes");
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_slow_calls() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            1
        };
        let err = within_deadline(deadline, "share insert", slow)
            .await
            .expect_err("slow call should time out");
        assert!(err.is_timeout());
        assert!(err.message().contains("share insert"));
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_deadline_never_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            "done"
        };
        let value = within_deadline(Deadline::none(), "lookup", slow)
            .await
            .expect("no deadline applies");
        assert_eq!(value, "done");
    }
}
