//! Poll store
//!
//! Keeps the poll list plus per-poll detail (options, votes, the current
//! user's ballot and voter names) for the polls that have been opened.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn, debug};
use uuid::Uuid;
use crate::database::PollRepository;
use crate::models::poll::{
    OptionInput, Poll, PollDraft, PollOption, PollStatus, PollVote, QuestionType, VoterDetail,
};
use crate::utils::errors::{DashboardError, PollRejection, Result};
use crate::utils::logging::log_member_action;
use super::auth::AuthStore;
use super::{timed, LoadingFlag};

const MIN_OPTIONS: usize = 2;

/// Title must be non-blank and at least two options must carry a label
pub fn validate_poll<'a>(title: &str, labels: impl IntoIterator<Item = &'a str>) -> std::result::Result<(), PollRejection> {
    let filled = labels.into_iter().filter(|l| !l.trim().is_empty()).count();
    if title.trim().is_empty() || filled < MIN_OPTIONS {
        return Err(PollRejection::TitleAndOptionsRequired);
    }
    Ok(())
}

/// Check a ballot against the poll's rules
pub fn validate_ballot(poll: &Poll, already_voted: bool, option_ids: &[Uuid]) -> std::result::Result<(), PollRejection> {
    if already_voted && !poll.allow_edit_vote {
        return Err(PollRejection::AlreadyVoted);
    }
    if option_ids.is_empty() {
        return Err(PollRejection::NoOptionSelected);
    }
    if poll.question_type == QuestionType::SingleChoice && option_ids.len() != 1 {
        return Err(PollRejection::SingleChoiceOnly);
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct PollState {
    polls: Vec<Poll>,
    options: HashMap<Uuid, Vec<PollOption>>,
    votes: HashMap<Uuid, Vec<PollVote>>,
    user_votes: HashMap<Uuid, Vec<PollVote>>,
    voter_details: HashMap<Uuid, Vec<VoterDetail>>,
    current_poll: Option<Uuid>,
}

impl PollState {
    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn get_poll_by_id(&self, id: Uuid) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == id)
    }

    /// The poll whose detail was fetched last
    pub fn current_poll(&self) -> Option<Uuid> {
        self.current_poll
    }

    pub fn active_polls(&self, now: DateTime<Utc>) -> Vec<&Poll> {
        self.polls.iter().filter(|p| p.is_open_at(now)).collect()
    }

    pub fn history_polls(&self, now: DateTime<Utc>) -> Vec<&Poll> {
        self.polls.iter().filter(|p| p.is_history_at(now)).collect()
    }

    pub fn poll_options(&self, poll_id: Uuid) -> &[PollOption] {
        self.options.get(&poll_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn votes(&self, poll_id: Uuid) -> &[PollVote] {
        self.votes.get(&poll_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn voter_details(&self, poll_id: Uuid) -> &[VoterDetail] {
        self.voter_details.get(&poll_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_user_voted(&self, poll_id: Uuid) -> bool {
        !self.user_vote_for_poll(poll_id).is_empty()
    }

    pub fn user_vote_for_poll(&self, poll_id: Uuid) -> &[PollVote] {
        self.user_votes.get(&poll_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Votes per option, with zero for options nobody picked
    pub fn vote_counts(&self, poll_id: Uuid) -> HashMap<Uuid, usize> {
        let mut counts: HashMap<Uuid, usize> = self.poll_options(poll_id).iter().map(|o| (o.id, 0)).collect();
        for vote in self.votes(poll_id) {
            *counts.entry(vote.option_id).or_insert(0) += 1;
        }
        counts
    }

    fn patch_status(&mut self, id: Uuid, status: PollStatus) {
        if let Some(poll) = self.polls.iter_mut().find(|p| p.id == id) {
            poll.status = status;
        }
    }

    fn remove(&mut self, id: Uuid) {
        self.polls.retain(|p| p.id != id);
        self.options.remove(&id);
        self.votes.remove(&id);
        self.user_votes.remove(&id);
        self.voter_details.remove(&id);
        if self.current_poll == Some(id) {
            self.current_poll = None;
        }
    }
}

#[derive(Clone)]
pub struct PollStore {
    repository: PollRepository,
    auth: AuthStore,
    state: Arc<RwLock<PollState>>,
    loading: LoadingFlag,
}

impl PollStore {
    pub fn new(repository: PollRepository, auth: AuthStore) -> Self {
        Self {
            repository,
            auth,
            state: Arc::new(RwLock::new(PollState::default())),
            loading: LoadingFlag::default(),
        }
    }

    pub async fn state(&self) -> PollState {
        self.state.read().await.clone()
    }

    /// Load the poll list; non-admins only see active and closed polls
    pub async fn fetch_polls(&self, is_admin: bool) -> Result<()> {
        let _loading = self.loading.start();
        let polls = timed("select", "polls", self.repository.list(!is_admin)).await?;
        self.state.write().await.polls = polls;
        Ok(())
    }

    /// Load a poll with its options, votes and the current user's ballot
    pub async fn fetch_poll_detail(&self, id: Uuid) -> Result<Poll> {
        let _loading = self.loading.start();
        let poll = self.repository.find_by_id(id).await?
            .ok_or(DashboardError::NotFound { entity: "poll", id })?;

        let (options, votes) = futures::try_join!(self.repository.options(id), self.repository.votes(id))?;
        let mine = match self.auth.current_user().await {
            Some(user) => self.repository.user_votes(id, user.user_id).await?,
            None => Vec::new(),
        };

        let mut state = self.state.write().await;
        match state.polls.iter_mut().find(|p| p.id == id) {
            Some(cached) => *cached = poll.clone(),
            None => state.polls.push(poll.clone()),
        }
        state.options.insert(id, options);
        state.votes.insert(id, votes);
        state.user_votes.insert(id, mine);
        state.current_poll = Some(id);

        Ok(poll)
    }

    pub async fn create_poll(&self, draft: &PollDraft, labels: &[String]) -> Result<Poll> {
        validate_poll(&draft.title, labels.iter().map(String::as_str))?;

        let labels: Vec<String> = labels
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let created_by = self.auth.current_user().await.map(|s| s.user_id);

        let poll = timed("insert", "polls", self.repository.create_with_options(draft, created_by, &labels)).await?;
        info!(poll_id = %poll.id, options = labels.len(), "Poll created");

        super::reload_quietly("polls", self.fetch_polls(true)).await;
        Ok(poll)
    }

    pub async fn update_poll(&self, id: Uuid, draft: &PollDraft, options: &[OptionInput]) -> Result<()> {
        validate_poll(&draft.title, options.iter().map(|o| o.label.as_str()))?;

        let options: Vec<OptionInput> = options
            .iter()
            .filter(|o| !o.label.trim().is_empty())
            .map(|o| OptionInput { id: o.id, label: o.label.trim().to_string() })
            .collect();

        timed("update", "polls", self.repository.update_with_options(id, draft, &options)).await?;
        info!(poll_id = %id, "Poll updated");

        super::reload_quietly("polls", async { self.fetch_poll_detail(id).await.map(|_| ()) }).await;
        Ok(())
    }

    /// Cast the current user's ballot
    pub async fn submit_vote(&self, poll_id: Uuid, option_ids: &[Uuid]) -> Result<()> {
        let user = self.auth.current_user().await.ok_or(PollRejection::LoginRequired)?;

        let cached = self.state.read().await.get_poll_by_id(poll_id).cloned();
        let poll = match cached {
            Some(poll) => poll,
            None => self.repository.find_by_id(poll_id).await?
                .ok_or(DashboardError::NotFound { entity: "poll", id: poll_id })?,
        };

        let previous = self.repository.user_votes(poll_id, user.user_id).await?;
        let already_voted = !previous.is_empty();
        if let Err(rejection) = validate_ballot(&poll, already_voted, option_ids) {
            debug!(poll_id = %poll_id, user_id = %user.user_id, reason = %rejection, "Vote rejected");
            return Err(rejection.into());
        }

        timed(
            "insert",
            "poll_votes",
            self.repository.cast_votes(poll_id, user.user_id, option_ids, already_voted),
        )
        .await?;
        log_member_action(user.member_id, "vote", Some(&poll_id.to_string()));

        super::reload_quietly("poll_votes", async { self.fetch_poll_detail(poll_id).await.map(|_| ()) }).await;
        Ok(())
    }

    /// Refresh every vote of a poll; failures leave an empty list
    pub async fn fetch_all_votes(&self, poll_id: Uuid) -> Vec<PollVote> {
        let votes = self.repository.votes(poll_id).await.unwrap_or_else(|e| {
            warn!(poll_id = %poll_id, error = %e, "Failed to fetch votes");
            Vec::new()
        });
        self.state.write().await.votes.insert(poll_id, votes.clone());
        votes
    }

    /// Refresh voter names of a poll; failures leave an empty list
    pub async fn fetch_voter_details(&self, poll_id: Uuid) -> Vec<VoterDetail> {
        let details = self.repository.voter_details(poll_id).await.unwrap_or_else(|e| {
            warn!(poll_id = %poll_id, error = %e, "Failed to fetch voter details");
            Vec::new()
        });
        self.state.write().await.voter_details.insert(poll_id, details.clone());
        details
    }

    pub async fn update_poll_status(&self, id: Uuid, status: PollStatus) -> Result<()> {
        timed("update", "polls", self.repository.set_status(id, status)).await?;
        info!(poll_id = %id, status = ?status, "Poll status changed");
        self.state.write().await.patch_status(id, status);
        Ok(())
    }

    /// Delete a poll outright; callers confirm with the user first
    pub async fn delete_poll(&self, id: Uuid) -> Result<()> {
        timed("delete", "polls", self.repository.delete(id)).await?;
        info!(poll_id = %id, "Poll deleted");
        self.state.write().await.remove(id);
        Ok(())
    }

    /// React to a vote change; only the poll being viewed is refreshed
    pub async fn handle_vote_change(&self, poll_id: Option<Uuid>) {
        let (current, anonymous) = {
            let state = self.state.read().await;
            let current = state.current_poll;
            let anonymous = current
                .and_then(|id| state.get_poll_by_id(id))
                .map(|p| p.is_anonymous)
                .unwrap_or(true);
            (current, anonymous)
        };

        let Some(id) = current else { return };
        if poll_id.is_some() && poll_id != Some(id) {
            return;
        }

        self.fetch_all_votes(id).await;
        if !anonymous {
            self.fetch_voter_details(id).await;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}
