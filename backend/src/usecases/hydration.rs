use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use crates::domain::{
    repositories::{
        customers::CustomerRepository, orders::OrderRepository, sessions::SessionRepository,
        users::UserRepository, zoom_tokens::ZoomTokenRepository,
    },
    value_objects::{
        profiles::{ProfileUser, UserProfile},
        sessions::{HydratedSession, Session, SessionBuckets},
        users::PublicUser,
    },
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::MeetingGateway,
    zoom_tokens::ZoomTokenUseCase,
};

pub const BUCKET_FETCH_LIMIT: i64 = 500;
pub const DEFAULT_PUBLISHED_LIMIT: i64 = 100;

fn db_error(context: &'static str) -> impl Fn(anyhow::Error) -> UseCaseError {
    move |err| {
        error!(db_error = ?err, "hydration: {context}");
        UseCaseError::Internal(err)
    }
}

/// Read side: attaches owners to sessions and builds the
/// upcoming/live/previous views.
pub struct HydrationUseCase<S, U, T, G, C, O>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
    C: CustomerRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    customer_repo: Arc<C>,
    order_repo: Arc<O>,
    tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
}

impl<S, U, T, G, C, O> HydrationUseCase<S, U, T, G, C, O>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
    C: CustomerRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        customer_repo: Arc<C>,
        order_repo: Arc<O>,
        tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            customer_repo,
            order_repo,
            tokens,
        }
    }

    /// One bulk user lookup; output keeps the input order. Sessions whose
    /// owner is gone come back without a user.
    pub async fn hydrate_sessions(
        &self,
        sessions: Vec<Session>,
    ) -> UseCaseResult<Vec<HydratedSession>> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<i64> = sessions.iter().map(|session| session.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users = self
            .user_repo
            .find_by_ids(user_ids)
            .await
            .map_err(db_error("failed to load session owners"))?;
        let by_id: HashMap<i64, PublicUser> = users
            .iter()
            .map(|user| (user.id, PublicUser::from(user)))
            .collect();

        Ok(sessions
            .into_iter()
            .map(|session| {
                let owner = by_id.get(&session.user_id).cloned();
                HydratedSession::new(session, owner)
            })
            .collect())
    }

    async fn partition(
        &self,
        upcoming: Vec<Session>,
        previous: Vec<Session>,
        now: i64,
    ) -> UseCaseResult<SessionBuckets> {
        let (upcoming, previous) =
            tokio::try_join!(self.hydrate_sessions(upcoming), self.hydrate_sessions(previous))?;
        Ok(SessionBuckets::partition(upcoming, previous, now))
    }

    /// Sessions hosted by the user, split around `now`.
    pub async fn hydrate_user(&self, user_id: i64, now: i64) -> UseCaseResult<SessionBuckets> {
        let (upcoming, previous) = tokio::try_join!(
            self.session_repo
                .list_upcoming_by_owner(user_id, now, BUCKET_FETCH_LIMIT),
            self.session_repo
                .list_previous_by_owner(user_id, now, BUCKET_FETCH_LIMIT),
        )
        .map_err(db_error("failed to load hosted sessions"))?;

        self.partition(upcoming, previous, now).await
    }

    /// Sessions the user has a succeeded order for, split around `now`.
    pub async fn hydrate_ordered_sessions(
        &self,
        user_id: i64,
        now: i64,
    ) -> UseCaseResult<SessionBuckets> {
        let Some(customer) = self
            .customer_repo
            .find_by_user_id(user_id)
            .await
            .map_err(db_error("failed to load customer"))?
        else {
            return Ok(SessionBuckets::default());
        };

        let orders = self
            .order_repo
            .list_succeeded_by_customer(customer.id, BUCKET_FETCH_LIMIT)
            .await
            .map_err(db_error("failed to load succeeded orders"))?;

        let mut session_ids: Vec<i64> = orders.iter().map(|order| order.session_id).collect();
        session_ids.sort_unstable();
        session_ids.dedup();
        if session_ids.is_empty() {
            return Ok(SessionBuckets::default());
        }

        let (upcoming, previous) = tokio::try_join!(
            self.session_repo
                .list_upcoming_by_ids(session_ids.clone(), now, BUCKET_FETCH_LIMIT),
            self.session_repo
                .list_previous_by_ids(session_ids, now, BUCKET_FETCH_LIMIT),
        )
        .map_err(db_error("failed to load ordered sessions"))?;

        self.partition(upcoming, previous, now).await
    }

    /// Hosted and ordered buckets plus, for the owner with Zoom installed, a
    /// fresh token. A token failure only drops the token.
    pub async fn hydrate_user_profile(
        &self,
        user_id: i64,
        viewer_id: Option<i64>,
    ) -> UseCaseResult<UserProfile> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(db_error("failed to load user"))?
            .ok_or_else(|| UseCaseError::NotFound(format!("user {user_id}")))?;

        let include_private = viewer_id == Some(user_id);
        let now = Utc::now().timestamp();

        let ordered = async {
            if include_private {
                self.hydrate_ordered_sessions(user_id, now).await
            } else {
                Ok(SessionBuckets::default())
            }
        };
        let zoom_token = async {
            if !(include_private && user.zoom_app_installed) {
                return Ok::<_, UseCaseError>(None);
            }
            match self.tokens.get_valid_token(user_id).await {
                Ok(token) => Ok(Some(token)),
                Err(err) => {
                    warn!(user_id, error = %err, "hydration: zoom token unavailable for profile");
                    Ok(None)
                }
            }
        };

        let (hosted, ordered, zoom_token) =
            tokio::try_join!(self.hydrate_user(user_id, now), ordered, zoom_token)?;

        info!(
            user_id,
            include_private,
            hosted_upcoming = hosted.upcoming.len(),
            hosted_live = hosted.live.len(),
            hosted_previous = hosted.previous.len(),
            "hydration: profile assembled"
        );

        let user = if include_private {
            ProfileUser::Private(user)
        } else {
            ProfileUser::Public(PublicUser::from(&user))
        };
        Ok(UserProfile {
            user,
            hosted,
            ordered,
            zoom_token,
        })
    }

    /// `purchased` is set only when a viewer is known.
    pub async fn get_session(
        &self,
        session_id: i64,
        viewer_id: Option<i64>,
    ) -> UseCaseResult<HydratedSession> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await
            .map_err(db_error("failed to load session"))?
            .ok_or_else(|| UseCaseError::NotFound(format!("session {session_id}")))?;

        let purchased = async {
            let Some(viewer_id) = viewer_id else {
                return Ok(None);
            };
            let customer = self
                .customer_repo
                .find_by_user_id(viewer_id)
                .await
                .map_err(db_error("failed to load viewer customer"))?;
            match customer {
                Some(customer) => self
                    .order_repo
                    .has_succeeded_order(customer.id, session_id)
                    .await
                    .map(Some)
                    .map_err(db_error("failed to check purchase")),
                None => Ok(Some(false)),
            }
        };

        let (mut hydrated, purchased) =
            tokio::try_join!(self.hydrate_sessions(vec![session]), purchased)?;
        let mut hydrated = hydrated
            .pop()
            .ok_or_else(|| UseCaseError::NotFound(format!("session {session_id}")))?;
        hydrated.purchased = purchased;
        Ok(hydrated)
    }

    pub async fn list_by_owner(&self, user_id: i64) -> UseCaseResult<Vec<HydratedSession>> {
        let sessions = self
            .session_repo
            .list_by_owner(user_id)
            .await
            .map_err(db_error("failed to list sessions by owner"))?;
        self.hydrate_sessions(sessions).await
    }

    pub async fn list_published(
        &self,
        from: i64,
        limit: Option<i64>,
        tag: Option<String>,
    ) -> UseCaseResult<Vec<HydratedSession>> {
        let limit = limit.unwrap_or(DEFAULT_PUBLISHED_LIMIT);
        if limit <= 0 {
            return Err(UseCaseError::Validation(
                "limit must be a positive number".to_string(),
            ));
        }
        let tag = tag.filter(|tag| !tag.trim().is_empty());

        let sessions = self
            .session_repo
            .list_published_from(from, limit, tag)
            .await
            .map_err(db_error("failed to list published sessions"))?;
        self.hydrate_sessions(sessions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        gateways::MockMeetingGateway,
        retry::RetryPolicy,
        test_support::{InMemorySessionRepository, manual_session, user},
    };
    use crates::domain::{
        repositories::{
            customers::MockCustomerRepository, orders::MockOrderRepository,
            sessions::MockSessionRepository, users::MockUserRepository,
            zoom_tokens::MockZoomTokenRepository,
        },
        value_objects::{
            customers::Customer, enums::payment_platforms::PaymentPlatform,
            enums::order_statuses::OrderStatus, enums::transaction_types::TransactionType,
            orders::Order,
        },
    };
    use mockall::predicate::eq;
    use std::time::Duration;

    type TestHydration<S> = HydrationUseCase<
        S,
        MockUserRepository,
        MockZoomTokenRepository,
        MockMeetingGateway,
        MockCustomerRepository,
        MockOrderRepository,
    >;

    fn build<S>(
        sessions: Arc<S>,
        users: MockUserRepository,
        customers: MockCustomerRepository,
        orders: MockOrderRepository,
        token_repo: MockZoomTokenRepository,
    ) -> TestHydration<S>
    where
        S: SessionRepository + Send + Sync + 'static,
    {
        let users = Arc::new(users);
        let tokens = Arc::new(ZoomTokenUseCase::new(
            Arc::clone(&sessions),
            Arc::clone(&users),
            Arc::new(token_repo),
            Arc::new(MockMeetingGateway::new()),
            RetryPolicy::new(2, Duration::from_millis(1)),
        ));
        HydrationUseCase::new(
            sessions,
            users,
            Arc::new(customers),
            Arc::new(orders),
            tokens,
        )
    }

    fn customer(id: i64, user_id: i64) -> Customer {
        Customer {
            id,
            created_at: Utc::now(),
            user_id,
            payment_platform: PaymentPlatform::Stripe,
            payment_platform_customer_id: format!("cus_{id}"),
            email: "buyer@example.com".to_string(),
        }
    }

    fn succeeded_order(customer_id: i64, session_id: i64) -> Order {
        Order {
            id: session_id * 10,
            created_at: Utc::now(),
            customer_id,
            payment_platform: PaymentPlatform::Stripe,
            status: OrderStatus::Succeeded,
            transaction_type: TransactionType::Purchase,
            payment_method_id: None,
            payment_platform_customer_id: format!("cus_{customer_id}"),
            payment_platform_order_id: format!("pi_{session_id}"),
            amount: 500,
            email: "buyer@example.com".to_string(),
            tags: String::new(),
            session_id,
            session_name: String::new(),
            session_description: String::new(),
            session_date: 0,
        }
    }

    #[tokio::test]
    async fn hydrated_sessions_keep_input_order() {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let a = sessions.seed(manual_session(5, "A", 100, 30));
        let b = sessions.seed(manual_session(9, "B", 200, 30));
        let c = sessions.seed(manual_session(5, "C", 300, 30));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_ids()
            .with(eq(vec![5, 9]))
            .times(1)
            .returning(|_| Ok(vec![user(9), user(5)]));

        let hydration = build(
            sessions,
            users,
            MockCustomerRepository::new(),
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        let hydrated = hydration
            .hydrate_sessions(vec![a.clone(), b.clone(), c.clone()])
            .await
            .unwrap();

        let order: Vec<i64> = hydrated.iter().map(|h| h.session.id).collect();
        let owners: Vec<Option<i64>> = hydrated
            .iter()
            .map(|h| h.user.as_ref().map(|u| u.id))
            .collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
        assert_eq!(owners, vec![Some(5), Some(9), Some(5)]);
    }

    #[tokio::test]
    async fn missing_owner_leaves_user_unset() {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let orphan = sessions.seed(manual_session(7, "A", 100, 30));

        let mut users = MockUserRepository::new();
        users.expect_find_by_ids().returning(|_| Ok(vec![]));

        let hydration = build(
            sessions,
            users,
            MockCustomerRepository::new(),
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        let hydrated = hydration.hydrate_sessions(vec![orphan]).await.unwrap();

        assert!(hydrated[0].user.is_none());
    }

    #[tokio::test]
    async fn hosted_sessions_are_bucketed_around_now() {
        let now = 1_700_000_000;
        let sessions = Arc::new(InMemorySessionRepository::default());
        let upcoming = sessions.seed(manual_session(5, "Later", now + 3_600, 30));
        let live = sessions.seed(manual_session(5, "Now", now - 30 * 60, 60));
        let previous = sessions.seed(manual_session(5, "Before", now - 90 * 60, 60));

        let mut users = MockUserRepository::new();
        users.expect_find_by_ids().returning(|_| Ok(vec![user(5)]));

        let hydration = build(
            sessions,
            users,
            MockCustomerRepository::new(),
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        let buckets = hydration.hydrate_user(5, now).await.unwrap();

        assert_eq!(buckets.upcoming[0].session.id, upcoming.id);
        assert_eq!(buckets.live.len(), 1);
        assert_eq!(buckets.live[0].session.id, live.id);
        assert_eq!(buckets.previous.len(), 1);
        assert_eq!(buckets.previous[0].session.id, previous.id);
    }

    #[tokio::test]
    async fn storage_failure_aborts_user_hydration() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_list_upcoming_by_owner()
            .returning(|_, _, _| Ok(vec![]));
        sessions
            .expect_list_previous_by_owner()
            .returning(|_, _, _| Err(anyhow::anyhow!("timeout")));

        let hydration = build(
            Arc::new(sessions),
            MockUserRepository::new(),
            MockCustomerRepository::new(),
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        assert!(matches!(
            hydration.hydrate_user(5, 1_700_000_000).await,
            Err(UseCaseError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn no_customer_means_no_ordered_sessions() {
        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_user_id()
            .with(eq(5))
            .returning(|_| Ok(None));

        let hydration = build(
            Arc::new(MockSessionRepository::new()),
            MockUserRepository::new(),
            customers,
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        let buckets = hydration.hydrate_ordered_sessions(5, 0).await.unwrap();

        assert_eq!(buckets, SessionBuckets::default());
    }

    #[tokio::test]
    async fn own_profile_survives_token_failure() {
        let now = Utc::now().timestamp();
        let sessions = Arc::new(InMemorySessionRepository::default());
        let bought = sessions.seed(manual_session(9, "Bought", now + 3_600, 30));

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut owner = user(id);
            owner.zoom_app_installed = true;
            Ok(Some(owner))
        });
        users
            .expect_find_by_ids()
            .returning(|ids| Ok(ids.into_iter().map(user).collect()));

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_user_id()
            .returning(|user_id| Ok(Some(customer(3, user_id))));

        let mut orders = MockOrderRepository::new();
        let bought_id = bought.id;
        orders
            .expect_list_succeeded_by_customer()
            .with(eq(3), eq(BUCKET_FETCH_LIMIT))
            .returning(move |customer_id, _| Ok(vec![succeeded_order(customer_id, bought_id)]));

        let mut token_repo = MockZoomTokenRepository::new();
        token_repo
            .expect_find_by_user_id()
            .returning(|_| Err(anyhow::anyhow!("tokens table unavailable")));

        let hydration = build(sessions, users, customers, orders, token_repo);

        let profile = hydration.hydrate_user_profile(5, Some(5)).await.unwrap();

        assert!(matches!(profile.user, ProfileUser::Private(_)));
        assert!(profile.zoom_token.is_none());
        assert_eq!(profile.ordered.upcoming.len(), 1);
        assert_eq!(profile.ordered.upcoming[0].session.id, bought.id);
    }

    #[tokio::test]
    async fn other_viewers_get_the_public_projection() {
        let sessions = Arc::new(InMemorySessionRepository::default());

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user(id))));

        let hydration = build(
            sessions,
            users,
            MockCustomerRepository::new(),
            MockOrderRepository::new(),
            MockZoomTokenRepository::new(),
        );

        let profile = hydration.hydrate_user_profile(5, Some(6)).await.unwrap();

        assert!(matches!(profile.user, ProfileUser::Public(_)));
        assert_eq!(profile.ordered, SessionBuckets::default());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json["user"].get("email").is_none());
    }

    #[tokio::test]
    async fn purchased_flag_reflects_succeeded_orders() {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let session = sessions.seed(manual_session(5, "Yoga", 100, 30));

        let mut users = MockUserRepository::new();
        users.expect_find_by_ids().returning(|_| Ok(vec![user(5)]));
        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_user_id()
            .with(eq(8))
            .returning(|user_id| Ok(Some(customer(3, user_id))));
        let mut orders = MockOrderRepository::new();
        orders
            .expect_has_succeeded_order()
            .with(eq(3), eq(session.id))
            .returning(|_, _| Ok(true));

        let hydration = build(
            sessions,
            users,
            customers,
            orders,
            MockZoomTokenRepository::new(),
        );

        let anonymous = hydration.get_session(session.id, None).await.unwrap();
        let buyer = hydration.get_session(session.id, Some(8)).await.unwrap();

        assert_eq!(anonymous.purchased, None);
        assert_eq!(buyer.purchased, Some(true));
    }
}
