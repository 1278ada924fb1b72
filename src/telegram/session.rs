//! Per-chat onboarding session state
//!
//! Each chat that is in the middle of adding a host owns one
//! [`AddHostSession`] in the global [`SessionManager`]. No session means the
//! chat is idle; committing or cancelling removes the session again.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use teloxide::types::MessageId;
use tokio::sync::RwLock;

/// Which input the add-host flow is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddHostStage {
    AwaitingName,
    AwaitingIp,
    AwaitingPort,
}

/// Collected state of one in-progress add-host flow
#[derive(Debug, Clone)]
pub struct AddHostSession {
    pub stage: AddHostStage,
    pub name: Option<String>,
    pub ip: Option<String>,
    /// Message id of the currently active prompt; each step deletes the
    /// previous prompt instead of appending a new message.
    pub prompt_message_id: Option<MessageId>,
}

impl AddHostSession {
    fn new() -> Self {
        Self {
            stage: AddHostStage::AwaitingName,
            name: None,
            ip: None,
            prompt_message_id: None,
        }
    }
}

/// Thread-safe store of add-host sessions keyed by chat id
pub struct SessionManager {
    sessions: RwLock<HashMap<i64, AddHostSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Begin a fresh flow for this chat, discarding any previous one
    pub async fn start(&self, chat_id: i64) {
        self.sessions
            .write()
            .await
            .insert(chat_id, AddHostSession::new());
    }

    /// Snapshot of the session for this chat, if one exists
    pub async fn get(&self, chat_id: i64) -> Option<AddHostSession> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    /// Store the received name and advance to the IP step
    pub async fn set_name(&self, chat_id: i64, name: String) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.name = Some(name);
            session.stage = AddHostStage::AwaitingIp;
        }
    }

    /// Store the validated IP and advance to the port step
    pub async fn set_ip(&self, chat_id: i64, ip: String) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.ip = Some(ip);
            session.stage = AddHostStage::AwaitingPort;
        }
    }

    /// Step back to the name prompt, discarding the collected name
    pub async fn back_to_name(&self, chat_id: i64) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.name = None;
            session.stage = AddHostStage::AwaitingName;
        }
    }

    /// Step back to the IP prompt, discarding the collected IP
    pub async fn back_to_ip(&self, chat_id: i64) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.ip = None;
            session.stage = AddHostStage::AwaitingIp;
        }
    }

    /// Remember which message is the active prompt for this chat
    pub async fn set_prompt(&self, chat_id: i64, message_id: MessageId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.prompt_message_id = Some(message_id);
        }
    }

    /// Drop the session (commit or cancel); nothing in progress survives
    pub async fn clear(&self, chat_id: i64) -> Option<AddHostSession> {
        self.sessions.write().await.remove(&chat_id)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GLOBAL SESSION MANAGER
// ============================================================================

static SESSION_MANAGER: Lazy<SessionManager> = Lazy::new(SessionManager::new);

/// Get the global session manager
pub fn get_session_manager() -> &'static SessionManager {
    &SESSION_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_linear_flow_collects_fields() {
        let manager = SessionManager::new();
        manager.start(1).await;
        assert_eq!(manager.get(1).await.unwrap().stage, AddHostStage::AwaitingName);

        manager.set_name(1, "web1".to_string()).await;
        let session = manager.get(1).await.unwrap();
        assert_eq!(session.stage, AddHostStage::AwaitingIp);
        assert_eq!(session.name.as_deref(), Some("web1"));

        manager.set_ip(1, "10.0.0.5".to_string()).await;
        let session = manager.get(1).await.unwrap();
        assert_eq!(session.stage, AddHostStage::AwaitingPort);
        assert_eq!(session.ip.as_deref(), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_back_transitions_discard_reentered_field() {
        let manager = SessionManager::new();
        manager.start(1).await;
        manager.set_name(1, "web1".to_string()).await;
        manager.set_ip(1, "10.0.0.5".to_string()).await;

        manager.back_to_ip(1).await;
        let session = manager.get(1).await.unwrap();
        assert_eq!(session.stage, AddHostStage::AwaitingIp);
        assert!(session.ip.is_none());
        assert_eq!(session.name.as_deref(), Some("web1"));

        manager.back_to_name(1).await;
        let session = manager.get(1).await.unwrap();
        assert_eq!(session.stage, AddHostStage::AwaitingName);
        assert!(session.name.is_none());
    }

    #[tokio::test]
    async fn test_cancel_clears_everything() {
        let manager = SessionManager::new();
        manager.start(1).await;
        manager.set_name(1, "web1".to_string()).await;

        assert!(manager.clear(1).await.is_some());
        assert!(manager.get(1).await.is_none());
        // Clearing twice is harmless
        assert!(manager.clear(1).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent_per_chat() {
        let manager = SessionManager::new();
        manager.start(1).await;
        manager.start(2).await;
        manager.set_name(1, "web1".to_string()).await;

        assert_eq!(manager.get(1).await.unwrap().stage, AddHostStage::AwaitingIp);
        assert_eq!(manager.get(2).await.unwrap().stage, AddHostStage::AwaitingName);
    }
}
