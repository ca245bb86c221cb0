use std::collections::BTreeSet;
use tracing::debug;

use crate::vendor::StageParticipantInfo;

/// Remote participants currently on the stage
///
/// The local participant never appears here: it is recognised by the
/// vendor's `is_local` flag and, once known, by its id, so a remote
/// participant carrying the same generated id is excluded as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    local_id: Option<String>,
    remote: BTreeSet<String>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, participant: &StageParticipantInfo) {
        if participant.is_local {
            debug!("Local participant is {}", participant.user_id);
            self.remote.remove(&participant.user_id);
            self.local_id = Some(participant.user_id.clone());
            return;
        }
        if self.is_local_id(&participant.user_id) {
            debug!("Ignoring remote join sharing the local id {}", participant.user_id);
            return;
        }
        self.remote.insert(participant.user_id.clone());
    }

    pub fn leave(&mut self, participant: &StageParticipantInfo) {
        if participant.is_local || self.is_local_id(&participant.user_id) {
            return;
        }
        self.remote.remove(&participant.user_id);
    }

    pub fn is_local_id(&self, user_id: &str) -> bool {
        self.local_id.as_deref() == Some(user_id)
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.remote.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remote.is_empty()
    }

    /// Remote ids in sorted order
    pub fn ids(&self) -> Vec<String> {
        self.remote.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.local_id = None;
        self.remote.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str) -> StageParticipantInfo {
        StageParticipantInfo {
            user_id: id.to_string(),
            ..Default::default()
        }
    }

    fn local(id: &str) -> StageParticipantInfo {
        StageParticipantInfo {
            user_id: id.to_string(),
            is_local: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_join_and_leave() {
        let mut set = ParticipantSet::new();
        set.join(&remote("alice"));
        set.join(&remote("bob"));
        set.join(&remote("alice"));
        assert_eq!(set.ids(), vec!["alice", "bob"]);

        set.leave(&remote("alice"));
        assert_eq!(set.ids(), vec!["bob"]);

        set.leave(&remote("nobody"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_local_participant_never_listed() {
        let mut set = ParticipantSet::new();
        set.join(&local("me"));
        set.join(&remote("viewer"));
        assert_eq!(set.ids(), vec!["viewer"]);
        assert_eq!(set.local_id(), Some("me"));

        set.leave(&local("me"));
        assert_eq!(set.ids(), vec!["viewer"]);
    }

    #[test]
    fn test_remote_sharing_local_id_is_excluded() {
        // Remote arrives first, local announcement with the same id follows
        let mut set = ParticipantSet::new();
        set.join(&remote("dup"));
        set.join(&local("dup"));
        assert!(set.is_empty());

        // Later remote joins and leaves with that id do not leak in
        set.join(&remote("dup"));
        assert!(!set.contains("dup"));
        set.leave(&remote("dup"));
        set.join(&remote("other"));
        assert_eq!(set.ids(), vec!["other"]);
    }
}
