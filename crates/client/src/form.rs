//! Form submission controller.
//!
//! Holds the draft for one create/edit screen, validates it locally, and
//! submits it with at most one request in flight. Server rejections are
//! routed onto the draft's fields by wire name; anything that does not
//! match a field becomes an error notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clubdesk_core::entities::{Editable, Resource};
use clubdesk_core::form::{Draft, FieldErrors};
use clubdesk_core::types::DbId;
use clubdesk_events::{Notification, NotificationBus};

use crate::api::ApiClient;
use crate::error::ApiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(DbId),
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<E> {
    /// The server accepted the draft.
    Saved(E),
    /// Client-side validation failed; no request was sent.
    Invalid(FieldErrors),
    /// The server rejected the draft; errors are on the form and/or in
    /// notifications.
    Rejected,
    /// A submission is already in flight; nothing was sent.
    Busy,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FormController<E: Editable> {
    mode: FormMode,
    draft: E::Draft,
    pristine: E::Draft,
    errors: FieldErrors,
    in_flight: Arc<AtomicBool>,
}

impl<E: Editable> FormController<E> {
    /// An empty form for a new record.
    pub fn create() -> Self {
        Self::with_draft(FormMode::Create, E::Draft::default())
    }

    /// A form hydrated from an existing record.
    pub fn edit(record: &E) -> Self {
        Self::with_draft(FormMode::Edit(record.id()), E::Draft::from(record))
    }

    /// Fetch a record by id and hydrate an edit form from it.
    pub async fn load(api: &ApiClient, id: DbId) -> ApiResult<Self> {
        let record = api.resource::<E>().get(id).await?;
        Ok(Self::edit(&record))
    }

    fn with_draft(mode: FormMode, draft: E::Draft) -> Self {
        Self {
            mode,
            pristine: draft.clone(),
            draft,
            errors: FieldErrors::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &E::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut E::Draft {
        &mut self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Shared handle to the in-flight flag, for a UI to observe.
    pub fn submitting_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }

    /// Run client-side validation, replacing the displayed errors.
    pub fn validate(&mut self) -> bool {
        self.errors = self.draft.check();
        self.errors.is_empty()
    }

    /// Whether the draft differs from what the form was opened with.
    pub fn is_dirty(&self) -> bool {
        serde_json::to_value(&self.draft).ok() != serde_json::to_value(&self.pristine).ok()
    }

    /// Throw away unsaved edits and errors (cancel).
    pub fn discard(&mut self) {
        self.draft = self.pristine.clone();
        self.errors.clear();
    }

    /// Validate and submit the draft.
    ///
    /// `on_saved` runs exactly once, and only when the server accepts the
    /// draft. Notifications for success and unmapped errors go to `bus`.
    pub async fn submit<F>(
        &mut self,
        api: &ApiClient,
        bus: &NotificationBus,
        on_saved: F,
    ) -> SubmitOutcome<E>
    where
        F: FnOnce(&E),
    {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!(resource = E::COLLECTION, "Submit ignored while in flight");
            return SubmitOutcome::Busy;
        };

        if !self.validate() {
            tracing::debug!(
                resource = E::COLLECTION,
                errors = self.errors.len(),
                "Draft failed validation",
            );
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        let resource = api.resource::<E>();
        let (result, verb) = match self.mode {
            FormMode::Create => (resource.create(&self.draft).await, "created"),
            FormMode::Edit(id) => (resource.update(id, &self.draft).await, "updated"),
        };

        match result {
            Ok(saved) => {
                self.errors.clear();
                self.pristine = match self.mode {
                    FormMode::Create => E::Draft::default(),
                    FormMode::Edit(_) => E::Draft::from(&saved),
                };
                self.draft = self.pristine.clone();
                bus.publish(
                    Notification::success(format!("{} {verb} successfully", E::LABEL))
                        .with_resource(E::COLLECTION),
                );
                on_saved(&saved);
                SubmitOutcome::Saved(saved)
            }
            Err(err) => {
                let (inline, unmapped) = err.server_body().route(&self.draft.field_names());
                tracing::info!(
                    resource = E::COLLECTION,
                    inline = inline.len(),
                    unmapped = unmapped.len(),
                    "Submission rejected",
                );
                self.errors = inline;
                for message in unmapped {
                    bus.publish(Notification::error(message).with_resource(E::COLLECTION));
                }
                SubmitOutcome::Rejected
            }
        }
    }
}

/// Delete a record and announce it.
pub async fn delete_record<E: Resource>(
    api: &ApiClient,
    bus: &NotificationBus,
    id: DbId,
) -> ApiResult<()> {
    match api.resource::<E>().delete(id).await {
        Ok(()) => {
            bus.publish(
                Notification::success(format!("{} deleted successfully", E::LABEL))
                    .with_resource(E::COLLECTION),
            );
            Ok(())
        }
        Err(err) => {
            bus.publish(Notification::error(err.to_string()).with_resource(E::COLLECTION));
            Err(err)
        }
    }
}
