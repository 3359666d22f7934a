//! Request handlers.

pub mod buyer;
pub mod export;
pub mod history;
pub mod import;

use crate::actor::Actor;
use crate::error::AppResult;
use crate::ratelimit::RateLimitScope;
use crate::state::AppState;

use leadbook_core::error::CoreError;

/// Count this request against the actor's window for `scope`, rejecting
/// with 429 when the budget is spent. A no-op when rate limiting is
/// disabled by configuration.
fn check_rate_limit(state: &AppState, actor: &Actor, scope: RateLimitScope) -> AppResult<()> {
    if !state.config.rate_limiting_enabled {
        return Ok(());
    }

    let decision = state.rate_limiter.check(actor.id, scope);
    if decision.allowed {
        Ok(())
    } else {
        tracing::warn!(actor_id = actor.id, ?scope, "Rate limit exceeded");
        Err(CoreError::RateLimited {
            retry_after_secs: decision.retry_after_secs,
        }
        .into())
    }
}
