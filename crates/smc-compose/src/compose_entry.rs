//! Compose entry: deep-link resolution and the single-entity fast path.

use smc_compose_core::{find_entity_by_key, Audience, DeepLink, DeepLinkResolution};

use crate::compose_controller::{ComposeController, FollowUp};
use crate::compose_errors::{ComposeErrorKind, ComposeStepError};
use crate::compose_selection::{decode_entities, entity_lookup_request};
use crate::compose_signals::ComposeSignal;

impl ComposeController {
    /// Starts a new session and routes it according to the deep link.
    pub(crate) async fn open(&self, link: Option<DeepLink>) -> FollowUp {
        let epoch = self.begin_session();
        let link = link.unwrap_or_default();
        let resolution = match link.resolve() {
            Ok(resolution) => resolution,
            Err(error) => {
                return self
                    .fail(epoch, ComposeErrorKind::Generic, error.into())
                    .await
            }
        };
        tracing::debug!(route = %link.route_path(), ?resolution, "opening compose");
        match resolution {
            DeepLinkResolution::FastPath => self.open_fast_path(epoch).await,
            DeepLinkResolution::Audience(audience) => {
                self.activate(epoch);
                self.select_audience(epoch, audience).await
            }
            DeepLinkResolution::Lookup { audience, value } => {
                self.open_with_lookup(epoch, audience, value).await
            }
        }
    }

    /// Looks `value` up for `audience` and jumps to relationship resolution.
    ///
    /// State is only populated once a candidate has been found.
    async fn open_with_lookup(&self, epoch: u64, audience: Audience, value: String) -> FollowUp {
        let request = entity_lookup_request(audience, Some(&value));
        let action = request.action;
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        let records = match result.and_then(|response| decode_entities(action, &response)) {
            Ok(records) => records,
            Err(error) => return self.fail(epoch, ComposeErrorKind::Generic, error).await,
        };
        self.activate(epoch);

        let candidate = match records.as_slice() {
            [only] => Some(only.clone()),
            candidates => find_entity_by_key(candidates, &value).cloned(),
        };
        let Some(record) = candidate else {
            return self
                .fail(
                    epoch,
                    ComposeErrorKind::Generic,
                    ComposeStepError::UnknownEntity { key: value },
                )
                .await;
        };
        self.update(epoch, |state| {
            state.assign_audience(audience);
            state.entities = records;
        })?;
        self.adopt_entity(epoch, record).await
    }

    /// Probes both audiences; exactly one candidate overall is selected
    /// without asking.
    async fn open_fast_path(&self, epoch: u64) -> FollowUp {
        let requests = [
            entity_lookup_request(Audience::Claims, None),
            entity_lookup_request(Audience::Employer, None),
        ];
        let result = self.request_all(&requests).await;
        if self.is_stale(epoch) {
            return None;
        }
        let decoded = result.and_then(|responses| {
            requests
                .iter()
                .zip(&responses)
                .map(|(request, response)| decode_entities(request.action, response))
                .collect::<Result<Vec<_>, _>>()
        });
        let mut lists = match decoded {
            Ok(lists) => lists,
            Err(error) => return self.fail(epoch, ComposeErrorKind::EntityFetch, error).await,
        };
        let accounts = lists.pop().unwrap_or_default();
        let claims = lists.pop().unwrap_or_default();
        let (claims_count, accounts_count) = (claims.len(), accounts.len());
        tracing::debug!(claims_count, accounts_count, "compose fast path counts");

        self.update(epoch, |state| {
            state.claims_count = claims_count;
            state.accounts_count = accounts_count;
        })?;
        self.activate(epoch);

        if claims_count + accounts_count != 1 {
            self.emit(ComposeSignal::RenderAudience);
            return None;
        }
        let (audience, records) = if claims_count == 1 {
            (Audience::Claims, claims)
        } else {
            (Audience::Employer, accounts)
        };
        let record = records.first().cloned()?;
        self.update(epoch, |state| {
            state.assign_audience(audience);
            state.entities = records;
        })?;
        self.adopt_entity(epoch, record).await
    }
}
