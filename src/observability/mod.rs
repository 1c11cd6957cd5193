//! 可观测性模块
//!
//! 原子计数器实现的轻量指标，经 `/metrics` 以 Prometheus
//! 文本格式暴露。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// 应用指标
#[derive(Clone, Default)]
pub struct AppMetrics {
    /// 处理过的对话轮数
    pub messages_total: Arc<AtomicU64>,
    /// 应答缓存命中
    pub cache_hits_total: Arc<AtomicU64>,
    /// 应答缓存未命中
    pub cache_misses_total: Arc<AtomicU64>,
    /// 内置问答命中
    pub static_qa_hits_total: Arc<AtomicU64>,
    /// 生成端调用失败
    pub responder_failures_total: Arc<AtomicU64>,
    /// 轮次处理失败（走致歉兜底）
    pub turn_errors_total: Arc<AtomicU64>,
    /// 当前 WebSocket 连接数
    pub ws_connections_active: Arc<AtomicUsize>,
    /// 累计 WebSocket 连接数
    pub ws_connections_total: Arc<AtomicU64>,
    /// 轮次处理耗时合计（毫秒）
    pub turn_duration_ms_sum: Arc<AtomicU64>,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一轮对话
    pub fn record_turn(&self, duration_ms: u64) {
        self.messages_total.fetch_add(1, Ordering::SeqCst);
        self.turn_duration_ms_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    /// 记录连接建立 / 断开
    pub fn record_connection_opened(&self) {
        self.ws_connections_total.fetch_add(1, Ordering::SeqCst);
        self.ws_connections_active.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_connection_closed(&self) {
        // 飽和減算：競合時に 0 未満へ落ちないようにする
        let _ = self
            .ws_connections_active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
    }

    /// 渲染 Prometheus 文本格式
    pub fn render_prometheus(&self) -> String {
        let mut out = String::with_capacity(1024);
        let counters: [(&str, &str, u64); 7] = [
            (
                "kokoro_messages_total",
                "Total conversation turns processed",
                self.messages_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_response_cache_hits_total",
                "Response cache hits",
                self.cache_hits_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_response_cache_misses_total",
                "Response cache misses",
                self.cache_misses_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_static_qa_hits_total",
                "Static QA table hits",
                self.static_qa_hits_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_responder_failures_total",
                "Responder call failures",
                self.responder_failures_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_turn_errors_total",
                "Turns that fell back to the apology response",
                self.turn_errors_total.load(Ordering::SeqCst),
            ),
            (
                "kokoro_ws_connections_total",
                "Total WebSocket connections accepted",
                self.ws_connections_total.load(Ordering::SeqCst),
            ),
        ];
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"
            ));
        }
        out.push_str(&format!(
            "# HELP kokoro_ws_connections_active Active WebSocket connections\n\
             # TYPE kokoro_ws_connections_active gauge\n\
             kokoro_ws_connections_active {}\n",
            self.ws_connections_active.load(Ordering::SeqCst)
        ));
        out.push_str(&format!(
            "# HELP kokoro_turn_duration_ms_sum Total turn processing time in milliseconds\n\
             # TYPE kokoro_turn_duration_ms_sum counter\n\
             kokoro_turn_duration_ms_sum {}\n",
            self.turn_duration_ms_sum.load(Ordering::SeqCst)
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_turn() {
        let metrics = AppMetrics::new();
        metrics.record_turn(120);
        metrics.record_turn(80);
        assert_eq!(metrics.messages_total.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.turn_duration_ms_sum.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn test_connection_gauge_never_underflows() {
        let metrics = AppMetrics::new();
        metrics.record_connection_closed();
        assert_eq!(metrics.ws_connections_active.load(Ordering::SeqCst), 0);
        metrics.record_connection_opened();
        metrics.record_connection_closed();
        assert_eq!(metrics.ws_connections_active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prometheus_rendering() {
        let metrics = AppMetrics::new();
        metrics.record_turn(10);
        let text = metrics.render_prometheus();
        assert!(text.contains("kokoro_messages_total 1"));
        assert!(text.contains("# TYPE kokoro_ws_connections_active gauge"));
    }
}
