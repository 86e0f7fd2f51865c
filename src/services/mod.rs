/*
 * Responsibility
 * - handler から使う service 群 (auth / security context / rating / id codec)
 */
pub mod auth;
pub mod id_codec;
pub mod rating;
pub mod security;
