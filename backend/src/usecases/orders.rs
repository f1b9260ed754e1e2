use std::sync::Arc;

use crates::{
    domain::{
        repositories::{
            customers::CustomerRepository, orders::OrderRepository, sessions::SessionRepository,
            users::UserRepository,
        },
        value_objects::{
            customers::{Customer, NewCustomer},
            enums::{
                order_statuses::OrderStatus, payment_platforms::PaymentPlatform,
                transaction_types::TransactionType,
            },
            orders::{CreateOrderRequest, CreatedOrder, NewOrder},
        },
    },
    payments::stripe_client::{
        EVENT_PAYMENT_INTENT_CREATED, EVENT_PAYMENT_INTENT_FAILED, EVENT_PAYMENT_INTENT_SUCCEEDED,
        StripeClient, StripeEvent,
    },
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::StripeGateway,
};

pub struct OrderUseCase<S, U, C, O, P>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CustomerRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    P: StripeGateway + 'static,
{
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    customer_repo: Arc<C>,
    order_repo: Arc<O>,
    stripe: Arc<P>,
}

impl<S, U, C, O, P> OrderUseCase<S, U, C, O, P>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    C: CustomerRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    P: StripeGateway + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        customer_repo: Arc<C>,
        order_repo: Arc<O>,
        stripe: Arc<P>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            customer_repo,
            order_repo,
            stripe,
        }
    }

    /// Returns the stored Stripe customer, creating it upstream first when
    /// the user has none yet.
    pub async fn get_or_create_customer(&self, user_id: i64) -> UseCaseResult<Customer> {
        if let Some(customer) = self
            .customer_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "orders: failed to load customer");
                UseCaseError::Internal(err)
            })?
        {
            return Ok(customer);
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "orders: failed to load user");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("user {user_id}")))?;

        let stripe_customer_id = self
            .stripe
            .create_customer(&user.email, user_id)
            .await
            .map_err(|err| {
                error!(user_id, error = ?err, "orders: stripe customer creation failed");
                UseCaseError::ExternalService(format!("stripe customer creation failed: {err}"))
            })?;

        let customer = self
            .customer_repo
            .create(NewCustomer {
                user_id,
                payment_platform: PaymentPlatform::Stripe,
                payment_platform_customer_id: stripe_customer_id,
                email: user.email,
            })
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "orders: failed to store customer");
                UseCaseError::Internal(err)
            })?;

        info!(user_id, customer_id = customer.id, "orders: customer created");
        Ok(customer)
    }

    pub async fn create_order(
        &self,
        user_id: i64,
        request: CreateOrderRequest,
    ) -> UseCaseResult<CreatedOrder> {
        let transaction_type = request
            .transaction_type
            .unwrap_or(TransactionType::Purchase);
        info!(
            user_id,
            session_id = request.session_id,
            cost = request.cost,
            transaction_type = %transaction_type,
            "orders: create order requested"
        );

        let session = self
            .session_repo
            .find_by_id(request.session_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "orders: failed to load session");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("session {}", request.session_id)))?;

        if transaction_type != TransactionType::Donation && request.cost != session.cost {
            warn!(
                user_id,
                session_id = session.id,
                requested = request.cost,
                expected = session.cost,
                "orders: cost mismatch"
            );
            return Err(UseCaseError::Validation(
                "cost does not match the session price".to_string(),
            ));
        }
        if request.cost <= 0 {
            return Err(UseCaseError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let customer = self.get_or_create_customer(user_id).await?;

        let purchased = self
            .order_repo
            .has_succeeded_order(customer.id, session.id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "orders: failed to check existing purchase");
                UseCaseError::Internal(err)
            })?;
        if purchased && transaction_type == TransactionType::Purchase {
            return Err(UseCaseError::Validation(
                "session already purchased".to_string(),
            ));
        }

        let description = format!("{}-{}", session.id, session.name);
        let intent = self
            .stripe
            .create_payment_intent(
                &customer.payment_platform_customer_id,
                request.cost,
                &description,
            )
            .await
            .map_err(|err| {
                error!(user_id, error = ?err, "orders: payment intent creation failed");
                UseCaseError::ExternalService(format!("payment intent creation failed: {err}"))
            })?;

        let order = self
            .order_repo
            .create(NewOrder {
                customer_id: customer.id,
                payment_platform: PaymentPlatform::Stripe,
                transaction_type,
                payment_platform_customer_id: customer.payment_platform_customer_id.clone(),
                payment_platform_order_id: intent.id.clone(),
                amount: request.cost,
                email: customer.email.clone(),
                tags: session.tags.clone(),
                session_id: session.id,
                session_name: session.name.clone(),
                session_description: session.description.clone(),
                session_date: session.start_time,
            })
            .await
            .map_err(|err| {
                error!(
                    user_id,
                    payment_intent_id = %intent.id,
                    db_error = ?err,
                    "orders: failed to store order"
                );
                UseCaseError::Internal(err)
            })?;

        info!(
            user_id,
            order_id = order.id,
            payment_intent_id = %intent.id,
            "orders: order created"
        );
        Ok(CreatedOrder {
            order,
            client_secret: intent.client_secret,
        })
    }

    pub async fn handle_stripe_event(&self, payload: &[u8], signature: &str) -> UseCaseResult<()> {
        let event = self
            .stripe
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "orders: stripe webhook verification failed");
                UseCaseError::Validation("signature verification failed".to_string())
            })?;

        let next_status = match event.type_.as_str() {
            EVENT_PAYMENT_INTENT_CREATED => OrderStatus::ProviderCreated,
            EVENT_PAYMENT_INTENT_SUCCEEDED => OrderStatus::Succeeded,
            EVENT_PAYMENT_INTENT_FAILED => OrderStatus::Failed,
            other => {
                info!(event_type = other, "orders: ignoring stripe event");
                return Ok(());
            }
        };

        self.apply_payment_event(&event, next_status).await
    }

    async fn apply_payment_event(
        &self,
        event: &StripeEvent,
        next_status: OrderStatus,
    ) -> UseCaseResult<()> {
        let intent = StripeClient::extract_payment_intent(event).ok_or_else(|| {
            warn!(event_type = %event.type_, "orders: event carries no payment intent");
            UseCaseError::Validation("event carries no payment intent".to_string())
        })?;

        let Some(order) = self
            .order_repo
            .find_by_payment_platform_order_id(&intent.id)
            .await
            .map_err(|err| {
                error!(payment_intent_id = %intent.id, db_error = ?err, "orders: failed to load order");
                UseCaseError::Internal(err)
            })?
        else {
            warn!(payment_intent_id = %intent.id, "orders: no order for payment intent");
            return Ok(());
        };

        if !order.status.can_transition_to(next_status) {
            info!(
                order_id = order.id,
                current = %order.status,
                next = %next_status,
                "orders: stale status transition ignored"
            );
            return Ok(());
        }

        let payment_method_id = match next_status {
            OrderStatus::Succeeded => intent.payment_method_id(),
            _ => None,
        };
        self.order_repo
            .update_status(order.id, next_status, payment_method_id)
            .await
            .map_err(|err| {
                error!(order_id = order.id, db_error = ?err, "orders: failed to update status");
                UseCaseError::Internal(err)
            })?;

        info!(order_id = order.id, status = %next_status, "orders: status updated");
        Ok(())
    }
}
