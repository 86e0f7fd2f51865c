//! Ambient security context for the current request.
//!
//! Responsibility:
//! - Principal / SecurityContext の型
//! - `ContextProvider`: "where does the current context come from" (task-local, fixed, ...)
//! - `SecurityContextAccessor`: the installed provider, handed out explicitly via `AppState`
//!
//! Every absence (no provider, no context, no principal) is reported as `None` / empty,
//! never as an error. Callers decide how to fail.
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Authenticated caller.
///
/// - `name` is the token subject (always present for an authenticated caller)
/// - `user_id` is the durable identifier; `None` when the subject is not a user id
/// - `roles` may be empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    user_id: Option<Uuid>,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>, user_id: Option<Uuid>) -> Self {
        Self {
            name: name.into(),
            user_id,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

/// Per-request security context. An anonymous request has a context without a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Source of the "current" security context.
///
/// Implementations must not panic; "no active context" is `None`.
pub trait ContextProvider: Send + Sync {
    fn current(&self) -> Option<Arc<SecurityContext>>;
}

tokio::task_local! {
    static REQUEST_CONTEXT: Arc<SecurityContext>;
}

/// Run `fut` with `ctx` as the request's security context.
///
/// The access middleware wraps `next.run(req)` with this, so every handler (and anything
/// it calls on the same task) sees the context through `TaskLocalContextProvider`.
pub async fn scope<F>(ctx: SecurityContext, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_CONTEXT.scope(Arc::new(ctx), fut).await
}

/// Reads the context installed by `scope()` for the running task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalContextProvider;

impl ContextProvider for TaskLocalContextProvider {
    fn current(&self) -> Option<Arc<SecurityContext>> {
        // Outside of a request scope (background task, startup) there is no context.
        REQUEST_CONTEXT.try_with(Arc::clone).ok()
    }
}

/// Always returns the same context.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticContextProvider {
    ctx: Option<Arc<SecurityContext>>,
}

#[cfg(test)]
impl StaticContextProvider {
    pub fn new(ctx: SecurityContext) -> Self {
        Self {
            ctx: Some(Arc::new(ctx)),
        }
    }

    /// A provider that is installed but has no active context.
    pub fn inactive() -> Self {
        Self { ctx: None }
    }
}

#[cfg(test)]
impl ContextProvider for StaticContextProvider {
    fn current(&self) -> Option<Arc<SecurityContext>> {
        self.ctx.clone()
    }
}

/// Holds the installed `ContextProvider`.
///
/// Built once at startup and shared as `Arc<SecurityContextAccessor>`.
/// `initialize` may be called again (tests swap in fakes); later reads see the new provider.
pub struct SecurityContextAccessor {
    provider: RwLock<Option<Arc<dyn ContextProvider>>>,
}

impl std::fmt::Debug for SecurityContextAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContextAccessor")
            .field("installed", &self.provider.read().is_some())
            .finish()
    }
}

impl SecurityContextAccessor {
    pub fn new(provider: Option<Arc<dyn ContextProvider>>) -> Self {
        Self {
            provider: RwLock::new(provider),
        }
    }

    /// Install (or remove, with `None`) the provider. Last call wins.
    pub fn initialize(&self, provider: Option<Arc<dyn ContextProvider>>) {
        tracing::debug!(
            installed = provider.is_some(),
            "security context provider initialized"
        );
        *self.provider.write() = provider;
    }

    pub fn current_context(&self) -> Option<Arc<SecurityContext>> {
        // Clone the provider out so the lock is not held while the provider runs.
        let provider = self.provider.read().clone()?;
        provider.current()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.current_context()?.principal().cloned()
    }

    pub fn current_roles(&self) -> BTreeSet<String> {
        self.current_principal().map(|p| p.roles).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Principal {
        Principal::new("alice", Some(Uuid::new_v4())).with_roles(["Admin"])
    }

    #[test]
    fn no_provider_means_no_principal_and_no_roles() {
        let accessor = SecurityContextAccessor::new(None);

        assert!(accessor.current_context().is_none());
        assert!(accessor.current_principal().is_none());
        assert!(accessor.current_roles().is_empty());
    }

    #[test]
    fn inactive_provider_means_no_principal() {
        let accessor =
            SecurityContextAccessor::new(Some(Arc::new(StaticContextProvider::inactive())));

        assert!(accessor.current_principal().is_none());
        assert!(accessor.current_roles().is_empty());
    }

    #[test]
    fn anonymous_context_has_no_principal() {
        let accessor = SecurityContextAccessor::new(Some(Arc::new(StaticContextProvider::new(
            SecurityContext::anonymous(),
        ))));

        assert!(accessor.current_context().is_some());
        assert!(accessor.current_principal().is_none());
        assert!(accessor.current_roles().is_empty());
    }

    #[test]
    fn principal_without_roles_has_empty_role_set() {
        let principal = Principal::new("bob", None);
        let accessor = SecurityContextAccessor::new(Some(Arc::new(StaticContextProvider::new(
            SecurityContext::authenticated(principal.clone()),
        ))));

        assert_eq!(accessor.current_principal(), Some(principal));
        assert!(accessor.current_roles().is_empty());
    }

    #[test]
    fn initialize_replaces_the_provider() {
        let accessor = SecurityContextAccessor::new(None);
        accessor.initialize(Some(Arc::new(StaticContextProvider::new(
            SecurityContext::authenticated(admin()),
        ))));
        assert!(accessor.current_roles().contains("Admin"));

        accessor.initialize(None);
        assert!(accessor.current_principal().is_none());
    }

    #[tokio::test]
    async fn task_local_provider_sees_only_the_scoped_context() {
        let provider = TaskLocalContextProvider;
        assert!(provider.current().is_none());

        let seen = scope(SecurityContext::authenticated(admin()), async {
            provider
                .current()
                .and_then(|ctx| ctx.principal().map(|p| p.name().to_string()))
        })
        .await;

        assert_eq!(seen.as_deref(), Some("alice"));
        assert!(provider.current().is_none());
    }
}
