//! 会话存储
//!
//! 活跃会话的并发映射，由应用状态持有。连接建立时创建，
//! 断开时取出并汇入访客记录。

use dashmap::DashMap;

use crate::models::session::Session;

/// 会话存储
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// 获取会话，不存在时创建
    pub fn get_or_create(&self, session_id: &str) -> Session {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id))
            .clone()
    }

    /// 读取会话快照
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// 在会话上执行修改，会话不存在时先创建
    pub fn update<F, T>(&self, session_id: &str, f: F) -> T
    where
        F: FnOnce(&mut Session) -> T,
    {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        f(entry.value_mut())
    }

    /// 移除会话并返回其最终状态
    pub fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.remove(session_id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 全部会话快照（统计用）
    pub fn snapshot_all(&self) -> Vec<Session> {
        self.sessions.iter().map(|e| e.clone()).collect()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
