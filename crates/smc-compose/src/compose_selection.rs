//! Audience, entity and relationship selection, the subscription gate, and
//! the work-position step that leads into the editor.

use serde_json::{json, Value};
use smc_compose_core::{
    find_entity_by_key, parse_entity_records, resolve_workpos, Audience, ComposeCoreError,
    DeepLink, EntityIdentifier, EntityRecord, SelectedEntity, WorkposContact,
};
use smc_contract::{
    BusAction, BusRequest, BusResponse, ConfirmContent, ConfirmDecision, ConfirmOption,
    ConfirmPrompt, ModalSizing,
};

use crate::compose_controller::{content_is_truthy, ComposeController, FollowUp};
use crate::compose_errors::{ComposeErrorKind, ComposeStepError};
use crate::compose_events::ComposeEvent;
use crate::compose_signals::ComposeSignal;

/// Entity lookup for `audience`. `None` lists every candidate.
pub(crate) fn entity_lookup_request(audience: Audience, term: Option<&str>) -> BusRequest {
    let action = match audience {
        Audience::Claims => BusAction::EntityClaimRequested,
        _ => BusAction::EntityAccountRequested,
    };
    let search = json!({ "SearchText": term }).to_string();
    BusRequest::new(
        action,
        vec![json!(""), json!(search), json!(audience.audience_code())],
    )
}

pub(crate) fn decode_entities(
    action: BusAction,
    response: &BusResponse,
) -> Result<Vec<EntityRecord>, ComposeStepError> {
    parse_entity_records(&response.content)
        .map_err(|source| ComposeStepError::MalformedContent { action, source })
}

fn decode_contact(
    action: BusAction,
    response: &BusResponse,
) -> Result<WorkposContact, ComposeStepError> {
    WorkposContact::from_content(&response.content)
        .map_err(|source| ComposeStepError::MalformedContent { action, source })
}

fn review_text(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl ComposeController {
    pub(crate) async fn select_audience_by_name(&self, epoch: u64, name: &str) -> FollowUp {
        match Audience::parse(name) {
            Ok(audience) => self.select_audience(epoch, audience).await,
            Err(error) => {
                self.fail(epoch, ComposeErrorKind::Generic, error.into())
                    .await
            }
        }
    }

    /// Loads the audience's candidate list with a null-term lookup.
    ///
    /// More candidates than the trim threshold switch the entity screen to
    /// search mode and leave `entities` empty.
    pub(crate) async fn select_audience(&self, epoch: u64, audience: Audience) -> FollowUp {
        self.update(epoch, |state| {
            state.assign_audience(audience);
            state.entities.clear();
            state.search_term = None;
            state.is_search = false;
        })?;
        let request = entity_lookup_request(audience, None);
        let action = request.action;
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        let records = match result.and_then(|response| decode_entities(action, &response)) {
            Ok(records) => records,
            Err(error) => return self.fail(epoch, ComposeErrorKind::EntityFetch, error).await,
        };
        let threshold = self.config().entities_trim_count;
        self.update(epoch, |state| {
            let total = records.len();
            state.trim_count = total.min(threshold);
            state.is_search = total > threshold;
            if !state.is_search {
                state.entities = records;
            }
            tracing::debug!(
                audience = audience.as_str(),
                total,
                is_search = state.is_search,
                "compose audience selected"
            );
        })?;
        self.emit(ComposeSignal::RenderEntity);
        self.update(epoch, |state| state.entity_init = false)?;
        None
    }

    pub(crate) async fn search_entities(&self, epoch: u64, term: Option<String>) -> FollowUp {
        let Some(term) = term else {
            self.update(epoch, |state| {
                state.search_term = None;
                state.entities.clear();
            })?;
            self.emit(ComposeSignal::RenderEntity);
            return None;
        };
        let audience = self.read(|state| state.audience);
        if !audience.is_selected() {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::EntityFetch,
                    ComposeCoreError::MissingAudience.into(),
                )
                .await;
        }
        self.update(epoch, |state| state.search_term = Some(term.clone()))?;
        let request = entity_lookup_request(audience, Some(&term));
        let action = request.action;
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        let records = match result.and_then(|response| decode_entities(action, &response)) {
            Ok(records) => records,
            Err(error) => return self.fail(epoch, ComposeErrorKind::EntityFetch, error).await,
        };
        self.update(epoch, |state| state.entities = records)?;
        self.emit(ComposeSignal::RenderEntity);
        None
    }

    pub(crate) async fn select_entity(&self, epoch: u64, business_key: &str) -> FollowUp {
        let record = self.read(|state| find_entity_by_key(&state.entities, business_key).cloned());
        let Some(record) = record else {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeStepError::UnknownEntity {
                        key: business_key.to_string(),
                    },
                )
                .await;
        };
        self.adopt_entity(epoch, record).await
    }

    /// Stores `record` as the selected entity and resolves its relationship.
    pub(crate) async fn adopt_entity(&self, epoch: u64, record: EntityRecord) -> FollowUp {
        let entity = match SelectedEntity::from_record(record, &self.config().entity_labels) {
            Ok(entity) => entity,
            Err(error) => {
                return self
                    .fail(epoch, ComposeErrorKind::Generic, error.into())
                    .await
            }
        };
        tracing::debug!(entity = %entity.value, kind = entity.kind.as_str(), "compose entity selected");
        self.update(epoch, |state| state.select_entity(entity))?;
        self.resolve_relationship(epoch).await
    }

    /// Picks the sole identifier or asks the user to choose one.
    async fn resolve_relationship(&self, epoch: u64) -> FollowUp {
        let identifiers = self.read(|state| state.entity_identifiers().to_vec());
        match identifiers.as_slice() {
            [] => {
                self.fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeStepError::MissingIdentifiers,
                )
                .await
            }
            [only] => {
                let only = only.clone();
                self.update(epoch, |state| state.relationship = Some(only))?;
                self.check_subscription(epoch).await
            }
            _ => {
                self.emit(ComposeSignal::RenderRelationship);
                None
            }
        }
    }

    pub(crate) async fn select_relationship(&self, epoch: u64, name: &str) -> FollowUp {
        let identifier = self.read(|state| {
            state
                .entity
                .as_ref()
                .and_then(|entity| entity.record.identifier_named(name).cloned())
        });
        let Some(identifier) = identifier else {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeStepError::UnknownRelationship {
                        name: name.to_string(),
                    },
                )
                .await;
        };
        self.update(epoch, |state| state.relationship = Some(identifier))?;
        self.check_subscription(epoch).await
    }

    /// Advances to the work position when subscribed; otherwise asks the user
    /// to subscribe.
    async fn check_subscription(&self, epoch: u64) -> FollowUp {
        let selection = self.read(|state| {
            Some((
                state.relationship.clone()?,
                state.entity.clone()?,
                state.audience,
            ))
        });
        let Some((identifier, entity, audience)) = selection else {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeCoreError::MissingRelationship.into(),
                )
                .await;
        };
        let request = BusRequest::new(
            BusAction::SubscribedRequested,
            vec![
                json!(identifier.identifier_type),
                json!(identifier.identifier_value),
            ],
        );
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        let subscribed = match result {
            Ok(response) => content_is_truthy(&response.content),
            Err(error) => return self.fail(epoch, ComposeErrorKind::Generic, error).await,
        };
        if subscribed {
            return self.load_workpos(epoch).await;
        }

        let prompt = ConfirmPrompt {
            content: ConfirmContent::Subscribe {
                audience: audience.as_str().to_string(),
                entity_text: entity.text,
                entity_identifier: entity.identifier,
                entity_value: entity.value,
                identifier_type: identifier.identifier_type.clone(),
                identifier_value: identifier.identifier_value.clone(),
                relationship_name: identifier.name.clone(),
            },
            no: Some(ConfirmOption::default()),
            yes: Some(ConfirmOption::default()),
            modal: Some(ModalSizing {
                width: self.config().subscribe_modal_width,
                height: None,
            }),
        };
        let decision = self.confirm(prompt).await;
        if self.is_stale(epoch) {
            return None;
        }
        match decision {
            ConfirmDecision::No => {
                tracing::debug!(audience = audience.as_str(), "compose subscription declined");
                Some(ComposeEvent::open(Some(DeepLink::audience(audience))))
            }
            ConfirmDecision::Yes => self.subscribe_entity(epoch, identifier).await,
        }
    }

    async fn subscribe_entity(&self, epoch: u64, identifier: EntityIdentifier) -> FollowUp {
        let request = BusRequest::new(
            BusAction::SubscribeRequested,
            vec![
                json!(identifier.identifier_value),
                json!(identifier.identifier_type),
            ],
        );
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        match result {
            Ok(_) => self.load_workpos(epoch).await,
            Err(error) => self.fail(epoch, ComposeErrorKind::Generic, error).await,
        }
    }

    /// Fetches the contact card and opens the editor. A failed lookup falls
    /// back to the department contact.
    async fn load_workpos(&self, epoch: u64) -> FollowUp {
        let (audience, key) = self.read(|state| {
            (
                state.audience,
                state
                    .entity
                    .as_ref()
                    .map(|entity| entity.record.business_data_value.clone()),
            )
        });
        let Some(key) = key else {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeCoreError::MissingEntity.into(),
                )
                .await;
        };
        let lookup = match audience {
            Audience::Claims => {
                let requests = [
                    BusRequest::new(BusAction::WorkposClaimRequested, vec![json!(key)]),
                    BusRequest::new(BusAction::WorkposReviewDateRequested, vec![json!(key)]),
                ];
                let result = self.request_all(&requests).await;
                result.and_then(|responses| match responses.as_slice() {
                    [contact, review] => Ok((
                        decode_contact(BusAction::WorkposClaimRequested, contact)?,
                        Some(review_text(&review.content)),
                    )),
                    _ => Err(ComposeStepError::Unsuccessful {
                        action: BusAction::WorkposReviewDateRequested,
                    }),
                })
            }
            Audience::Employer => {
                let action = BusAction::WorkposAccountRequested;
                let result = self
                    .request(BusRequest::new(action, vec![json!(key)]))
                    .await;
                result
                    .and_then(|response| decode_contact(action, &response))
                    .map(|contact| (contact, None))
            }
            Audience::None => {
                return self
                    .fail(
                        epoch,
                        ComposeErrorKind::Generic,
                        ComposeCoreError::MissingAudience.into(),
                    )
                    .await
            }
        };
        if self.is_stale(epoch) {
            return None;
        }
        let (contact, review) = lookup.unwrap_or_else(|error| {
            tracing::warn!(error = %error, "compose work position unavailable, using department contact");
            (WorkposContact::placeholder(), None)
        });
        let workpos = resolve_workpos(
            audience,
            &contact,
            review.as_deref(),
            &self.config().workpos,
        );
        self.update(epoch, |state| state.workpos = workpos)?;
        self.emit(ComposeSignal::RenderEditor);
        None
    }
}
