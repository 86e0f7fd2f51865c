pub mod context;
pub mod identity;
pub mod roles;

#[cfg(test)]
pub use context::StaticContextProvider;
pub use context::{
    ContextProvider, Principal, SecurityContext, SecurityContextAccessor,
    TaskLocalContextProvider,
};
pub use identity::current_user_id;
pub use roles::is_elevated;
