use crate::{binding::ServiceError, context::Context};
use std::{fmt, sync::Arc};

/// A service's immediate children, for namespace browsing. The binding layer
/// applies the pattern; services only report names.
pub trait ChildrenGlobber: Send + Sync {
    fn glob_children(&self, ctx: &Context) -> Result<Vec<String>, ServiceError>;
}

/// Resolved namespace-browsing capability attached to a server stub.
#[derive(Clone)]
pub struct GlobState {
    children: Arc<dyn ChildrenGlobber>,
}

impl GlobState {
    pub fn new(children: Arc<dyn ChildrenGlobber>) -> Self {
        Self { children }
    }

    /// Children matching `pattern`, in the order the service reports them.
    pub fn glob(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, ServiceError> {
        let children = self.children.glob_children(ctx)?;
        Ok(children
            .into_iter()
            .filter(|child| pattern_matches(pattern, child))
            .collect())
    }

    /// Ordered capability resolution for stub construction.
    ///
    /// The stub itself is probed before the implementation it wraps, so a
    /// browse method declared on the interface is not shadowed by one the
    /// implementation happens to offer. This order is part of the binding
    /// contract.
    pub fn resolve(stub: &dyn Globber, inner: &dyn Globber) -> Option<GlobState> {
        stub.glob_state().or_else(|| inner.glob_state())
    }
}

impl fmt::Debug for GlobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GlobState(..)")
    }
}

/// Implemented by anything that may offer the browse capability alongside
/// its typed methods. The default offers none.
pub trait Globber {
    fn glob_state(&self) -> Option<GlobState> {
        None
    }
}

/// `*` matches any run of characters; everything else matches itself.
pub fn pattern_matches(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == name,
        Some((prefix, rest)) => {
            let Some(tail) = name.strip_prefix(prefix) else {
                return false;
            };
            if rest.is_empty() {
                return true;
            }
            (0..=tail.len())
                .filter(|split| tail.is_char_boundary(*split))
                .any(|split| pattern_matches(rest, &tail[split..]))
        }
    }
}
