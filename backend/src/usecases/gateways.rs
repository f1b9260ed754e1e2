use std::sync::Mutex;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    images::unsplash_client::UnsplashClient,
    payments::stripe_client::{PaymentIntent, StripeClient, StripeEvent},
    zoom::{
        payloads::{
            CreateMeetingRequest, CreatedMeeting, MeetingInfo, MeetingListPage, OAuthToken,
            UpdateMeetingRequest, ZoomUser,
        },
        zoom_client::{ZoomApiError, ZoomClient},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub type ZoomResult<T> = std::result::Result<T, ZoomApiError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingGateway: Send + Sync {
    fn install_url(&self, state: &str) -> AnyResult<String>;

    async fn create_meeting(
        &self,
        access_token: &str,
        request: CreateMeetingRequest,
    ) -> ZoomResult<CreatedMeeting>;

    async fn update_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<String>,
        request: UpdateMeetingRequest,
    ) -> ZoomResult<()>;

    async fn delete_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<String>,
    ) -> ZoomResult<()>;

    async fn get_meeting(&self, access_token: &str, meeting_id: i64) -> ZoomResult<MeetingInfo>;

    async fn list_upcoming_meetings(
        &self,
        access_token: &str,
        page_number: i64,
    ) -> ZoomResult<MeetingListPage>;

    async fn current_user(&self, access_token: &str) -> ZoomResult<ZoomUser>;

    async fn refresh_token(&self, refresh_token: &str) -> ZoomResult<OAuthToken>;

    async fn exchange_code(&self, code: &str) -> ZoomResult<OAuthToken>;
}

#[async_trait]
impl MeetingGateway for ZoomClient {
    fn install_url(&self, state: &str) -> AnyResult<String> {
        self.install_url(state)
    }

    async fn create_meeting(
        &self,
        access_token: &str,
        request: CreateMeetingRequest,
    ) -> ZoomResult<CreatedMeeting> {
        self.create_meeting(access_token, &request).await
    }

    async fn update_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<String>,
        request: UpdateMeetingRequest,
    ) -> ZoomResult<()> {
        self.update_meeting(access_token, meeting_id, occurrence_id.as_deref(), &request)
            .await
    }

    async fn delete_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<String>,
    ) -> ZoomResult<()> {
        self.delete_meeting(access_token, meeting_id, occurrence_id.as_deref())
            .await
    }

    async fn get_meeting(&self, access_token: &str, meeting_id: i64) -> ZoomResult<MeetingInfo> {
        self.get_meeting(access_token, meeting_id).await
    }

    async fn list_upcoming_meetings(
        &self,
        access_token: &str,
        page_number: i64,
    ) -> ZoomResult<MeetingListPage> {
        self.list_upcoming_meetings(access_token, page_number).await
    }

    async fn current_user(&self, access_token: &str) -> ZoomResult<ZoomUser> {
        self.current_user(access_token).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> ZoomResult<OAuthToken> {
        self.refresh_token(refresh_token).await
    }

    async fn exchange_code(&self, code: &str) -> ZoomResult<OAuthToken> {
        self.exchange_code(code).await
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn find_image_url(&self, query: &str) -> AnyResult<String>;
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn find_image_url(&self, query: &str) -> AnyResult<String> {
        self.find_image_url(query).await
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_customer(&self, email: &str, user_id: i64) -> AnyResult<String>;

    async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount: i64,
        description: &str,
    ) -> AnyResult<PaymentIntent>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_customer(&self, email: &str, user_id: i64) -> AnyResult<String> {
        self.create_customer(email, user_id).await
    }

    async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount: i64,
        description: &str,
    ) -> AnyResult<PaymentIntent> {
        self.create_payment_intent(customer_id, amount, description)
            .await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

pub const MEETING_PASSWORD_LEN: usize = 9;

pub trait MeetingPasswordSource: Send + Sync {
    fn next_password(&self) -> String;
}

/// Process-wide generator, seeded once. Not a secret source.
pub struct SeededPasswordSource {
    rng: Mutex<StdRng>,
}

impl SeededPasswordSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl MeetingPasswordSource for SeededPasswordSource {
    fn next_password(&self) -> String {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let value: u64 = rng.gen_range(100_000_000..1_000_000_000);
        let mut password = value.to_string();
        password.truncate(MEETING_PASSWORD_LEN);
        password
    }
}
