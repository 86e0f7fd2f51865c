pub mod access_jwt;
pub mod factory;
#[cfg(test)]
pub mod test_support;

pub use access_jwt::AuthService;
pub use factory::build_auth_service;
