//! Member roster store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use crate::database::MemberRepository;
use crate::models::member::{Member, MemberProfile, Rt, UpdateMemberRequest};
use crate::utils::errors::Result;
use super::{timed, LoadingFlag};

/// Loaded roster with its queries
#[derive(Debug, Clone, Default)]
pub struct MemberSnapshot {
    members: Vec<Member>,
}

impl MemberSnapshot {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members grouped per RT; all four RTs are always present
    pub fn members_by_rt(&self) -> BTreeMap<Rt, Vec<&Member>> {
        let mut grouped: BTreeMap<Rt, Vec<&Member>> = Rt::ALL.iter().map(|rt| (*rt, Vec::new())).collect();
        for member in &self.members {
            grouped.entry(member.profile.rt).or_default().push(member);
        }
        grouped
    }

    pub fn total_members(&self) -> usize {
        self.members.len()
    }

    pub fn get_member_by_id(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Case-insensitive match on name or job, plain substring match on phone
    pub fn search_members(&self, query: &str) -> Vec<&Member> {
        let lower = query.to_lowercase();
        self.members
            .iter()
            .filter(|m| {
                m.profile.full_name.to_lowercase().contains(&lower)
                    || m.profile.phone.contains(query)
                    || m.profile.job.as_deref().is_some_and(|job| job.to_lowercase().contains(&lower))
            })
            .collect()
    }

    pub fn filter_by_rt(&self, rt: Rt) -> Vec<&Member> {
        self.members.iter().filter(|m| m.profile.rt == rt).collect()
    }
}

#[derive(Clone)]
pub struct MemberStore {
    repository: MemberRepository,
    snapshot: Arc<RwLock<MemberSnapshot>>,
    include_admins: Arc<AtomicBool>,
    loading: LoadingFlag,
}

impl MemberStore {
    pub fn new(repository: MemberRepository) -> Self {
        Self {
            repository,
            snapshot: Arc::new(RwLock::new(MemberSnapshot::default())),
            include_admins: Arc::new(AtomicBool::new(true)),
            loading: LoadingFlag::default(),
        }
    }

    /// Load the roster; without `include_admins` members holding an admin account are left out
    pub async fn load_members(&self, include_admins: bool) -> Result<()> {
        self.include_admins.store(include_admins, Ordering::Relaxed);
        let _loading = self.loading.start();

        let members = timed("select", "members", self.repository.list_with_roles()).await?;
        let members = if include_admins {
            members
        } else {
            members.into_iter().filter(|m| !m.is_admin()).collect()
        };

        *self.snapshot.write().await = MemberSnapshot::new(members);
        Ok(())
    }

    /// Reload with the flag of the last load
    pub async fn reload(&self) -> Result<()> {
        self.load_members(self.include_admins.load(Ordering::Relaxed)).await
    }

    pub async fn snapshot(&self) -> MemberSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn get_member_by_id(&self, id: Uuid) -> Option<Member> {
        self.snapshot.read().await.get_member_by_id(id).cloned()
    }

    pub async fn create_member(&self, profile: &MemberProfile) -> Result<Member> {
        let member = timed("insert", "members", self.repository.create(profile)).await?;
        info!(member_id = %member.id, "Member created");
        super::reload_quietly("members", self.reload()).await;
        Ok(member)
    }

    pub async fn update_member(&self, id: Uuid, request: UpdateMemberRequest) -> Result<Member> {
        let member = timed("update", "members", self.repository.update(id, request)).await?;
        super::reload_quietly("members", self.reload()).await;
        Ok(member)
    }

    /// Delete a member and their account
    pub async fn delete_member(&self, id: Uuid) -> Result<()> {
        timed("delete", "members", self.repository.delete(id)).await?;
        info!(member_id = %id, "Member deleted");
        super::reload_quietly("members", self.reload()).await;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }
}
