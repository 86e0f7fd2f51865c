//! Role-gated rating accessor.
//!
//! Responsibility:
//! - 呼び出し元が elevated role (Admin / SubAdmin) を持つ時だけ本当の rating を返す
//! - それ以外は全部 0 (fail-closed)
//! - 判定結果を RatingCache に載せて、同じ caller/entity の再判定を省く
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::services::rating::cache::{
    RatingCache, RatingCacheConfig, RatingCacheKey, Visibility,
};
use crate::services::rating::ratable::Ratable;
use crate::services::security::{SecurityContextAccessor, is_elevated};

#[derive(Debug)]
pub struct SecureRatingService {
    context: Arc<SecurityContextAccessor>,
    cache: RatingCache,
}

impl SecureRatingService {
    pub fn new(context: Arc<SecurityContextAccessor>, cache_config: RatingCacheConfig) -> Self {
        Self {
            context,
            cache: RatingCache::new(cache_config),
        }
    }

    /// Rating of `entity` as the current caller is allowed to see it.
    ///
    /// Never fails: missing entity, missing context/principal, or a non-elevated caller all
    /// yield `0`.
    pub fn secure_rating<E>(&self, entity: Option<&E>) -> Decimal
    where
        E: Ratable + ?Sized,
    {
        let Some(entity) = entity else {
            return Decimal::ZERO;
        };

        let raw = entity.rating();
        if raw.is_zero() {
            return Decimal::ZERO;
        }

        // Read the principal once; key and decision must come from the same snapshot.
        let principal = self.context.current_principal();
        let key = RatingCacheKey::new(entity.kind(), entity.entity_key(), principal.as_ref());

        if let Some(visibility) = self.cache.get(&key) {
            return visibility.apply(raw);
        }

        let elevated = principal.as_ref().is_some_and(|p| is_elevated(p.roles()));
        let visibility = if elevated {
            Visibility::Revealed
        } else {
            Visibility::Masked
        };

        tracing::trace!(
            kind = ?entity.kind(),
            entity = %entity.entity_key(),
            principal = principal.as_ref().map(|p| p.name()),
            ?visibility,
            "rating visibility decided"
        );

        self.cache.insert(key, visibility);
        visibility.apply(raw)
    }

    /// Forget every cached decision. Returns the number of dropped entries.
    pub fn clear_cache(&self) -> usize {
        let cleared = self.cache.clear();
        tracing::info!(cleared, "rating decision cache cleared");
        cleared
    }

    #[cfg(test)]
    pub fn cached_decisions(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::rating::ratable::EntityKind;
    use crate::services::security::{
        ContextProvider, Principal, SecurityContext, StaticContextProvider,
    };

    struct Profile {
        id: &'static str,
        rating: Decimal,
    }

    impl Ratable for Profile {
        fn kind(&self) -> EntityKind {
            EntityKind::UserProfile
        }
        fn entity_key(&self) -> String {
            self.id.to_string()
        }
        fn rating(&self) -> Decimal {
            self.rating
        }
    }

    struct Seat {
        session: i64,
        user: &'static str,
        rating: Decimal,
    }

    impl Ratable for Seat {
        fn kind(&self) -> EntityKind {
            EntityKind::RosterEntry
        }
        fn entity_key(&self) -> String {
            format!("{}:{}", self.session, self.user)
        }
        fn rating(&self) -> Decimal {
            self.rating
        }
    }

    fn five() -> Decimal {
        Decimal::new(50, 1)
    }

    fn profile(rating: Decimal) -> Profile {
        Profile { id: "u1", rating }
    }

    fn provider_for(name: &str, roles: &[&str]) -> Arc<dyn ContextProvider> {
        let principal = Principal::new(name, None).with_roles(roles.iter().copied());
        Arc::new(StaticContextProvider::new(SecurityContext::authenticated(
            principal,
        )))
    }

    fn service(provider: Option<Arc<dyn ContextProvider>>) -> SecureRatingService {
        SecureRatingService::new(
            Arc::new(SecurityContextAccessor::new(provider)),
            RatingCacheConfig {
                ttl: Duration::from_secs(60),
                max_entries: 100,
            },
        )
    }

    #[test]
    fn no_roles_sees_zero() {
        let svc = service(Some(provider_for("alice", &[])));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), Decimal::ZERO);
    }

    #[test]
    fn admin_sees_rating() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), five());
    }

    #[test]
    fn subadmin_sees_rating() {
        let svc = service(Some(provider_for("alice", &["SubAdmin"])));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), five());
    }

    #[test]
    fn other_roles_see_zero() {
        let svc = service(Some(provider_for("alice", &["Player", "admin"])));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), Decimal::ZERO);
    }

    #[test]
    fn zero_rating_is_zero_for_admin_and_skips_cache() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        assert_eq!(svc.secure_rating(Some(&profile(Decimal::ZERO))), Decimal::ZERO);
        assert_eq!(svc.cached_decisions(), 0);
    }

    #[test]
    fn absent_entity_is_zero_for_both_shapes() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        assert_eq!(svc.secure_rating::<Profile>(None), Decimal::ZERO);
        assert_eq!(svc.secure_rating::<Seat>(None), Decimal::ZERO);
        assert_eq!(svc.cached_decisions(), 0);

        let svc = service(None);
        assert_eq!(svc.secure_rating::<Profile>(None), Decimal::ZERO);
        assert_eq!(svc.secure_rating::<Seat>(None), Decimal::ZERO);
    }

    #[test]
    fn roster_entries_use_the_same_gate() {
        let seat = Seat {
            session: 7,
            user: "u1",
            rating: five(),
        };

        let svc = service(Some(provider_for("alice", &["SubAdmin"])));
        assert_eq!(svc.secure_rating(Some(&seat)), five());

        let svc = service(Some(provider_for("bob", &[])));
        assert_eq!(svc.secure_rating(Some(&seat)), Decimal::ZERO);
    }

    #[test]
    fn no_provider_sees_zero() {
        let svc = service(None);
        for rating in [Decimal::ZERO, Decimal::ONE, five()] {
            assert_eq!(svc.secure_rating(Some(&profile(rating))), Decimal::ZERO);
        }
    }

    #[test]
    fn no_active_context_or_principal_sees_zero() {
        let svc = service(Some(Arc::new(StaticContextProvider::inactive())));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), Decimal::ZERO);

        let svc = service(Some(Arc::new(StaticContextProvider::new(
            SecurityContext::anonymous(),
        ))));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), Decimal::ZERO);
    }

    #[test]
    fn repeated_reads_agree_and_hit_the_cache() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        let entity = profile(five());

        let first = svc.secure_rating(Some(&entity));
        let second = svc.secure_rating(Some(&entity));

        assert_eq!(first, second);
        assert_eq!(svc.cached_decisions(), 1);
    }

    #[test]
    fn clear_then_role_change_reflects_new_roles() {
        let svc = service(Some(provider_for("alice", &[])));
        let entity = profile(five());

        assert_eq!(svc.secure_rating(Some(&entity)), Decimal::ZERO);

        assert_eq!(svc.clear_cache(), 1);
        svc.context.initialize(Some(provider_for("alice", &["Admin"])));

        assert_eq!(svc.secure_rating(Some(&entity)), five());
    }

    #[test]
    fn role_change_without_clear_is_not_stale() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        let entity = profile(five());
        assert_eq!(svc.secure_rating(Some(&entity)), five());

        svc.context.initialize(Some(provider_for("alice", &[])));
        assert_eq!(svc.secure_rating(Some(&entity)), Decimal::ZERO);
    }

    #[test]
    fn elevated_view_does_not_leak_to_other_principals() {
        let svc = service(Some(provider_for("admin", &["Admin"])));
        let entity = profile(five());
        assert_eq!(svc.secure_rating(Some(&entity)), five());

        svc.context.initialize(Some(provider_for("player", &[])));
        assert_eq!(svc.secure_rating(Some(&entity)), Decimal::ZERO);
        assert_eq!(svc.cached_decisions(), 2);
    }

    #[test]
    fn cached_decision_applies_to_updated_raw_rating() {
        let svc = service(Some(provider_for("alice", &["Admin"])));
        assert_eq!(svc.secure_rating(Some(&profile(five()))), five());

        let updated = profile(Decimal::new(72, 1));
        assert_eq!(svc.secure_rating(Some(&updated)), Decimal::new(72, 1));
    }

    #[test]
    fn ttl_beyond_instant_range_still_reveals() {
        let svc = SecureRatingService::new(
            Arc::new(SecurityContextAccessor::new(Some(provider_for(
                "alice",
                &["Admin"],
            )))),
            RatingCacheConfig {
                ttl: Duration::from_secs(u64::MAX),
                max_entries: 100,
            },
        );
        let entity = profile(five());

        assert_eq!(svc.secure_rating(Some(&entity)), five());
        assert_eq!(svc.secure_rating(Some(&entity)), five());
        assert_eq!(svc.cached_decisions(), 1);
    }

    thread_local! {
        static THREAD_CONTEXT: std::cell::RefCell<Option<Arc<SecurityContext>>> =
            const { std::cell::RefCell::new(None) };
    }

    /// Each OS thread carries its own caller.
    struct PerThreadProvider;

    impl ContextProvider for PerThreadProvider {
        fn current(&self) -> Option<Arc<SecurityContext>> {
            THREAD_CONTEXT.with(|slot| slot.borrow().clone())
        }
    }

    #[test]
    fn concurrent_callers_each_see_their_own_view() {
        const THREADS: usize = 8;
        const READS: usize = 2_000;
        const MAX_ENTRIES: usize = 3;

        let svc = SecureRatingService::new(
            Arc::new(SecurityContextAccessor::new(Some(Arc::new(PerThreadProvider)))),
            RatingCacheConfig {
                ttl: Duration::from_secs(60),
                max_entries: MAX_ENTRIES,
            },
        );
        let seats: Vec<Seat> = (0..4)
            .map(|i| Seat {
                session: i,
                user: "u1",
                rating: five(),
            })
            .collect();

        std::thread::scope(|s| {
            for t in 0..THREADS {
                let (svc, seats) = (&svc, &seats);
                s.spawn(move || {
                    let elevated = t % 2 == 0;
                    let roles: &[&str] = if elevated { &["Admin"] } else { &["Player"] };
                    let principal = Principal::new(format!("caller-{t}"), None)
                        .with_roles(roles.iter().copied());
                    THREAD_CONTEXT.with(|slot| {
                        *slot.borrow_mut() = Some(Arc::new(SecurityContext::authenticated(
                            principal,
                        )))
                    });

                    let expected = if elevated { five() } else { Decimal::ZERO };
                    for i in 0..READS {
                        let seat = &seats[i % seats.len()];
                        assert_eq!(svc.secure_rating(Some(seat)), expected, "caller-{t}");
                    }
                });
            }
        });

        assert!(svc.cached_decisions() <= MAX_ENTRIES);
    }

    #[test]
    fn masks_inside_a_request_scope() {
        use crate::services::security::{TaskLocalContextProvider, context::scope};

        let svc = service(Some(Arc::new(TaskLocalContextProvider)));
        let entity = profile(five());

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let admin = SecurityContext::authenticated(
            Principal::new("admin", None).with_roles(["Admin"]),
        );
        let seen = rt.block_on(scope(admin, async { svc.secure_rating(Some(&entity)) }));
        assert_eq!(seen, five());

        // outside any scope there is no context
        assert_eq!(svc.secure_rating(Some(&entity)), Decimal::ZERO);
    }
}
