//! Redirect precedence for site keys and slugs.
//!
//! Both site keys and slugs follow the same three rules, applied in
//! order:
//!
//! 1. an explicit redirect to an active target wins;
//! 2. a non-primary entry without a redirect points at the primary
//!    entry for the same scope;
//! 3. anything else is canonical.
//!
//! A redirect whose target is missing or inactive is treated as if it
//! were absent, so rule 2 still applies to it.

use uuid::Uuid;

/// Maximum number of redirect hops followed before giving up and
/// serving the last entry reached.
pub const MAX_REDIRECT_HOPS: usize = 5;

/// A row that can take part in redirect resolution.
pub trait RedirectNode {
    fn node_id(&self) -> Uuid;
    fn is_primary(&self) -> bool;
    fn is_active(&self) -> bool;
    fn redirect_to_id(&self) -> Option<Uuid>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyDecision<T> {
    Canonical,
    RedirectTo(T),
}

/// Apply the precedence rules to `node`.
///
/// `redirect_target` is the row `node.redirect_to_id()` points at (if it
/// could be loaded) and `primary` the primary row for the same scope.
pub fn decide<T>(node: &T, redirect_target: Option<&T>, primary: Option<&T>) -> KeyDecision<T>
where
    T: RedirectNode + Clone,
{
    if node.redirect_to_id().is_some() {
        if let Some(target) = redirect_target {
            if target.is_active()
                && target.node_id() != node.node_id()
                && Some(target.node_id()) == node.redirect_to_id()
            {
                return KeyDecision::RedirectTo(target.clone());
            }
        }
    }

    if !node.is_primary() {
        if let Some(primary) = primary {
            if primary.is_active() && primary.node_id() != node.node_id() {
                return KeyDecision::RedirectTo(primary.clone());
            }
        }
    }

    KeyDecision::Canonical
}
