use crate::app::system::RecommendationSystem;
use crate::core::recommendation::Recommendation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 每位顧客保留的對話輪數上限
pub const MAX_CHAT_TURNS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub message: String,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

pub struct AppState {
    pub system: RecommendationSystem,
    chats: Mutex<HashMap<u64, VecDeque<ChatTurn>>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(system: RecommendationSystem) -> Self {
        Self {
            system,
            chats: Mutex::new(HashMap::new()),
        }
    }

    pub fn shared(system: RecommendationSystem) -> SharedState {
        Arc::new(Self::new(system))
    }

    pub async fn record_turn(&self, customer_id: u64, turn: ChatTurn) {
        let mut chats = self.chats.lock().await;
        let history = chats.entry(customer_id).or_default();
        history.push_back(turn);
        while history.len() > MAX_CHAT_TURNS {
            history.pop_front();
        }
    }

    pub async fn history(&self, customer_id: u64) -> Vec<ChatTurn> {
        let chats = self.chats.lock().await;
        chats
            .get(&customer_id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }
}
