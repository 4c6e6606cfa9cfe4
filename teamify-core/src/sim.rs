//! In-memory platform simulation.
//!
//! Backs the local simulator binary and the test suite: deterministic state,
//! injectable per-operation failures (deny a participant's move, vanish a
//! channel out-of-band, revoke create/delete rights).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;

use crate::platform::{
    ChannelHandle, ChannelKind, Container, Participant, Platform, PlatformError,
};

#[derive(Default)]
struct SimState {
    next_id: u64,
    channels: HashMap<String, ChannelHandle>,
    containers: HashMap<String, Container>,
    participants: HashMap<String, Participant>,
    /// participant id -> voice channel id they currently occupy.
    occupancy: HashMap<String, String>,
    /// (channel id, text) in send order.
    messages: Vec<(String, String)>,

    // Fault injection.
    deny_moves: HashSet<String>,
    gone_participants: HashSet<String>,
    deny_container_create: bool,
    deny_channel_create: HashSet<String>,
    deny_delete: HashSet<String>,
}

/// Deterministic in-memory [`Platform`].
#[derive(Default)]
pub struct SimPlatform {
    state: Mutex<SimState>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(state: &mut SimState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }

    pub fn add_channel(&self, name: &str, kind: ChannelKind) -> ChannelHandle {
        let mut state = self.state.lock().unwrap();
        let id = Self::alloc_id(&mut state, "ch");
        let handle = ChannelHandle {
            id: id.clone(),
            name: name.to_string(),
            kind,
            parent: None,
            created_at: Utc::now(),
        };
        state.channels.insert(id, handle.clone());
        handle
    }

    /// Register a participant and place them in a voice channel.
    pub fn join(&self, participant: Participant, channel_id: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .occupancy
            .insert(participant.id.clone(), channel_id.to_string());
        state.participants.insert(participant.id.clone(), participant);
    }

    /// Remove a participant from whatever voice channel they occupy.
    pub fn leave(&self, participant_id: &str) {
        self.state.lock().unwrap().occupancy.remove(participant_id);
    }

    /// Delete a channel out-of-band, as a platform admin would.
    pub fn vanish_channel(&self, channel_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.channels.remove(channel_id);
        state.occupancy.retain(|_, ch| ch != channel_id);
    }

    pub fn deny_move(&self, participant_id: &str) {
        self.state.lock().unwrap().deny_moves.insert(participant_id.to_string());
    }

    /// Make this participant's moves fail as not-found, as if they left the
    /// server between scheduling and execution.
    pub fn mark_gone(&self, participant_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.gone_participants.insert(participant_id.to_string());
        state.occupancy.remove(participant_id);
    }

    pub fn deny_container_creation(&self) {
        self.state.lock().unwrap().deny_container_create = true;
    }

    /// Deny creation of a voice channel with this exact name.
    pub fn deny_channel_creation(&self, name: &str) {
        self.state.lock().unwrap().deny_channel_create.insert(name.to_string());
    }

    pub fn deny_delete(&self, channel_id: &str) {
        self.state.lock().unwrap().deny_delete.insert(channel_id.to_string());
    }

    // ── Inspection ─────────────────────────────────────────────────

    pub fn channel_exists(&self, channel_id: &str) -> bool {
        self.state.lock().unwrap().channels.contains_key(channel_id)
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().unwrap().containers.len()
    }

    pub fn voice_channel_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .channels
            .values()
            .filter(|c| c.kind == ChannelKind::Voice)
            .count()
    }

    /// Participant ids currently in a voice channel.
    pub fn occupants(&self, channel_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .occupancy
            .iter()
            .filter(|(_, ch)| ch.as_str() == channel_id)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Messages sent so far, as (channel id, text).
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().messages.clone()
    }
}

#[async_trait::async_trait]
impl Platform for SimPlatform {
    async fn list_members(
        &self,
        channel: &ChannelHandle,
    ) -> Result<Vec<Participant>, PlatformError> {
        let state = self.state.lock().unwrap();
        if !state.channels.contains_key(&channel.id) {
            return Err(PlatformError::NotFound);
        }
        let mut members: Vec<Participant> = state
            .occupancy
            .iter()
            .filter(|(_, ch)| ch.as_str() == channel.id)
            .filter_map(|(p, _)| state.participants.get(p).cloned())
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(members)
    }

    async fn find_channel(
        &self,
        name: &str,
        kind: ChannelKind,
    ) -> Result<Option<ChannelHandle>, PlatformError> {
        let state = self.state.lock().unwrap();
        if kind == ChannelKind::Category {
            return Ok(state.containers.values().find(|c| c.name == name).map(|c| {
                ChannelHandle {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    kind: ChannelKind::Category,
                    parent: None,
                    created_at: Utc::now(),
                }
            }));
        }
        Ok(state
            .channels
            .values()
            .find(|c| c.kind == kind && c.name == name)
            .cloned())
    }

    async fn list_channels(
        &self,
        kind: ChannelKind,
    ) -> Result<Vec<ChannelHandle>, PlatformError> {
        let state = self.state.lock().unwrap();
        let mut channels: Vec<ChannelHandle> = state
            .channels
            .values()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect();
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(channels)
    }

    async fn create_container(&self, name: &str) -> Result<Container, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.deny_container_create {
            return Err(PlatformError::PermissionDenied);
        }
        let id = Self::alloc_id(&mut state, "cat");
        let container = Container { id: id.clone(), name: name.to_string() };
        state.containers.insert(id, container.clone());
        Ok(container)
    }

    async fn create_voice_channel(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<ChannelHandle, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.deny_channel_create.contains(name) {
            return Err(PlatformError::PermissionDenied);
        }
        if !state.containers.contains_key(&container.id) {
            return Err(PlatformError::NotFound);
        }
        let id = Self::alloc_id(&mut state, "ch");
        let handle = ChannelHandle {
            id: id.clone(),
            name: name.to_string(),
            kind: ChannelKind::Voice,
            parent: Some(container.id.clone()),
            created_at: Utc::now(),
        };
        state.channels.insert(id, handle.clone());
        Ok(handle)
    }

    async fn delete_channel(&self, channel: &ChannelHandle) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if !state.channels.contains_key(&channel.id) {
            return Err(PlatformError::NotFound);
        }
        if state.deny_delete.contains(&channel.id) {
            return Err(PlatformError::PermissionDenied);
        }
        state.channels.remove(&channel.id);
        state.occupancy.retain(|_, ch| ch != &channel.id);
        Ok(())
    }

    async fn move_participant(
        &self,
        participant: &Participant,
        target: &ChannelHandle,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.gone_participants.contains(&participant.id) {
            return Err(PlatformError::NotFound);
        }
        if !state.channels.contains_key(&target.id) {
            return Err(PlatformError::NotFound);
        }
        if state.deny_moves.contains(&participant.id) {
            return Err(PlatformError::PermissionDenied);
        }
        state
            .occupancy
            .insert(participant.id.clone(), target.id.clone());
        Ok(())
    }

    async fn send_message(
        &self,
        channel: &ChannelHandle,
        text: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if !state.channels.contains_key(&channel.id) {
            return Err(PlatformError::NotFound);
        }
        state.messages.push((channel.id.clone(), text.to_string()));
        Ok(())
    }
}
