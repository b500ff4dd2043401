//! Following redirect chains for site keys and slugs.
//!
//! A single [`decide`] step only looks one hop ahead. Here the step is
//! repeated until an entry is canonical, the hop limit is hit or an
//! entry repeats. In the last two cases the last entry reached is
//! served.

use std::collections::HashSet;

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::redirect::{KeyDecision, MAX_REDIRECT_HOPS, RedirectNode, decide};
use tracing::{debug, warn};
use uuid::Uuid;

/// Loads the rows a redirect step needs.
pub(crate) trait RedirectSource<T>: Send + Sync {
    /// The row a `redirect_to_id` points at, if it still exists.
    fn target(&self, id: Uuid) -> impl Future<Output = LokalResult<Option<T>>> + Send;
    /// The primary row for the scope `node` belongs to.
    fn primary(&self, node: &T) -> impl Future<Output = LokalResult<Option<T>>> + Send;
}

/// The end of a redirect chain.
#[derive(Debug, Clone)]
pub(crate) struct ChainEnd<T> {
    pub(crate) node: T,
    /// At least one hop was taken.
    pub(crate) redirected: bool,
}

pub(crate) async fn follow<T, R>(source: &R, start: T) -> LokalResult<ChainEnd<T>>
where
    T: RedirectNode + Clone + Send + Sync,
    R: RedirectSource<T>,
{
    let mut visited = HashSet::from([start.node_id()]);
    let mut current = start;
    let mut redirected = false;

    for _ in 0..MAX_REDIRECT_HOPS {
        let target = match current.redirect_to_id() {
            Some(id) => source.target(id).await?,
            None => None,
        };
        let primary = if current.is_primary() {
            None
        } else {
            source.primary(&current).await?
        };

        match decide(&current, target.as_ref(), primary.as_ref()) {
            KeyDecision::Canonical => return Ok(ChainEnd { node: current, redirected }),
            KeyDecision::RedirectTo(next) => {
                if !visited.insert(next.node_id()) {
                    warn!(id = %next.node_id(), "Redirect cycle detected");
                    return Ok(ChainEnd { node: current, redirected });
                }
                debug!(from = %current.node_id(), to = %next.node_id(), "Following redirect");
                current = next;
                redirected = true;
            }
        }
    }

    warn!(
        id = %current.node_id(),
        hops = MAX_REDIRECT_HOPS,
        "Redirect hop limit reached"
    );
    Ok(ChainEnd { node: current, redirected })
}

/// Turn a `NotFound` into `None`, passing other errors through.
pub(crate) fn optional<T>(result: LokalResult<T>) -> LokalResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LokalError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
