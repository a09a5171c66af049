use chrono::{Duration, NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::clinical::{AppointmentStatus, QueueSubscription, VisitType};
use shared_store::repository::AppointmentFilter;
use shared_store::Datastore;

use crate::models::{FeedEntry, FeedPage, FeedQuery, SubscriptionError};

/// Per-user subscription sets over named queues, and the merged work feed
/// built from them.
pub struct SubscriptionAggregator {
    store: Datastore,
}

impl SubscriptionAggregator {
    pub fn new(store: Datastore) -> Self {
        Self { store }
    }

    /// Add a queue to the principal's subscription set. Idempotent:
    /// subscribing twice leaves the set unchanged.
    pub async fn subscribe(
        &self,
        principal: &User,
        queue_id: Uuid,
    ) -> Result<QueueSubscription, SubscriptionError> {
        self.store
            .queues
            .find(queue_id)
            .await?
            .ok_or(SubscriptionError::QueueNotFound)?;

        let now = Utc::now();
        let mut subscription = self
            .store
            .subscriptions
            .find_for_user(principal.id)
            .await?
            .unwrap_or_else(|| QueueSubscription::empty(principal.id, now));

        if !subscription.queue_ids.contains(&queue_id) {
            subscription.queue_ids.push(queue_id);
            subscription.updated_at = now;
            self.store.subscriptions.upsert(&subscription).await?;
            info!("User {} subscribed to queue {}", principal.id, queue_id);
        }

        Ok(subscription)
    }

    /// Remove a queue from the set; unsubscribing a non-member is a no-op.
    pub async fn unsubscribe(
        &self,
        principal: &User,
        queue_id: Uuid,
    ) -> Result<QueueSubscription, SubscriptionError> {
        let now = Utc::now();
        let mut subscription = self
            .store
            .subscriptions
            .find_for_user(principal.id)
            .await?
            .unwrap_or_else(|| QueueSubscription::empty(principal.id, now));

        if let Some(position) = subscription.queue_ids.iter().position(|id| *id == queue_id) {
            subscription.queue_ids.remove(position);
            subscription.updated_at = now;
            self.store.subscriptions.upsert(&subscription).await?;
            info!("User {} unsubscribed from queue {}", principal.id, queue_id);
        }

        Ok(subscription)
    }

    pub async fn current(&self, principal: &User) -> Result<QueueSubscription, SubscriptionError> {
        Ok(self
            .store
            .subscriptions
            .find_for_user(principal.id)
            .await?
            .unwrap_or_else(|| QueueSubscription::empty(principal.id, Utc::now())))
    }

    /// Merged feed over the subscribed queues: queue-major order, each
    /// queue's entries in that queue's own order, every row tagged with
    /// its source. Any unresolvable subscribed queue aborts the whole
    /// aggregation.
    pub async fn build_feed(
        &self,
        principal: &User,
        search_term: Option<&str>,
        visit_type: Option<VisitType>,
    ) -> Result<Vec<FeedEntry>, SubscriptionError> {
        let subscription = match self
            .store
            .subscriptions
            .find_for_user(principal.id)
            .await?
        {
            Some(subscription) => subscription,
            None => return Ok(Vec::new()),
        };

        let term = search_term.map(|t| t.to_lowercase());
        let mut feed = Vec::new();

        for queue_id in &subscription.queue_ids {
            let queue = self
                .store
                .queues
                .find(*queue_id)
                .await?
                .ok_or(SubscriptionError::QueueNotFound)?;

            let fetched = self
                .store
                .appointments
                .fetch_many(&queue.appointment_ids)
                .await?;

            for appointment_id in &queue.appointment_ids {
                let Some(appointment) = fetched.iter().find(|a| a.id == *appointment_id)
                else {
                    continue;
                };

                if appointment.deleted {
                    continue;
                }
                if let Some(wanted) = visit_type {
                    if appointment.visit_type != wanted {
                        continue;
                    }
                }
                if let Some(term) = &term {
                    let patient = self.store.patients.find(appointment.patient_id).await?;
                    let matched = patient
                        .map(|p| p.full_name().to_lowercase().contains(term))
                        .unwrap_or(false);
                    if !matched {
                        continue;
                    }
                }

                feed.push(FeedEntry {
                    queue_id: Some(queue.id),
                    queue_name: Some(queue.name.clone()),
                    appointment: appointment.clone(),
                });
            }
        }

        debug!(
            "Aggregated feed for user {}: {} entries over {} queues",
            principal.id,
            feed.len(),
            subscription.queue_ids.len()
        );
        Ok(feed)
    }

    /// The user's working appointment list. Subscribed users get the
    /// aggregated feed; everyone else falls back to their own visits
    /// checked in today.
    pub async fn get_user_appointments(
        &self,
        principal: &User,
        query: FeedQuery,
    ) -> Result<FeedPage, SubscriptionError> {
        let use_subscriptions = query.use_subscriptions.unwrap_or(true);

        if use_subscriptions {
            let has_subscriptions = self
                .store
                .subscriptions
                .find_for_user(principal.id)
                .await?
                .map(|s| !s.queue_ids.is_empty())
                .unwrap_or(false);

            if has_subscriptions {
                let feed = self
                    .build_feed(principal, query.search.as_deref(), query.visit_type)
                    .await?;

                let total = feed.len();
                let offset = query.offset.unwrap_or(0);
                let entries: Vec<FeedEntry> = match query.limit {
                    Some(limit) => feed.into_iter().skip(offset).take(limit).collect(),
                    None => feed.into_iter().skip(offset).collect(),
                };

                return Ok(FeedPage {
                    entries,
                    total,
                    offset,
                    from_subscriptions: true,
                });
            }
        }

        self.provider_fallback(principal, query).await
    }

    /// The non-subscription path: the provider's own appointments checked
    /// in since midnight.
    async fn provider_fallback(
        &self,
        principal: &User,
        query: FeedQuery,
    ) -> Result<FeedPage, SubscriptionError> {
        let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let filter = AppointmentFilter {
            provider_id: Some(principal.id),
            status: Some(AppointmentStatus::CheckedIn),
            visit_type: query.visit_type,
            checked_in_from: Some(start_of_day),
            checked_in_to: Some(start_of_day + Duration::days(1)),
            patient_name: query.search.clone(),
            ..Default::default()
        };

        // Paging applied after the search so `total` counts the full
        // result set, matching the subscription path.
        let appointments = self.store.appointments.search(&filter).await?;
        let total = appointments.len();
        let offset = query.offset.unwrap_or(0);
        let appointments: Vec<_> = match query.limit {
            Some(limit) => appointments.into_iter().skip(offset).take(limit).collect(),
            None => appointments.into_iter().skip(offset).collect(),
        };

        Ok(FeedPage {
            entries: appointments
                .into_iter()
                .map(|appointment| FeedEntry {
                    queue_id: None,
                    queue_name: None,
                    appointment,
                })
                .collect(),
            total,
            offset,
            from_subscriptions: false,
        })
    }
}
