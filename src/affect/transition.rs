//! 情感转移引擎
//!
//! 显示情感由概率状态机决定：以上一轮显示情感选择基础转移行，
//! 按心理状态与用户情感对工作副本重加权，归一化后做累积分布采样。
//! 强制类别（DangerQuestion / Explaining）直接透传，不参与采样。

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashMap;

use crate::models::emotion::Emotion;
use crate::models::mental_state::MentalState;

/// 采样目标集合（固定顺序）
const TARGETS: [Emotion; 5] = [
    Emotion::Neutral,
    Emotion::Happy,
    Emotion::Sad,
    Emotion::Angry,
    Emotion::Surprised,
];

/// 基础转移行，与 `TARGETS` 同序
fn base_row(previous: Emotion) -> [f64; 5] {
    match previous {
        // neutral, happy, sad, angry, surprised
        Emotion::Happy => [0.3, 0.5, 0.04, 0.01, 0.15],
        Emotion::Sad => [0.4, 0.15, 0.4, 0.04, 0.01],
        Emotion::Angry => [0.5, 0.01, 0.15, 0.3, 0.04],
        Emotion::Surprised => [0.3, 0.3, 0.1, 0.1, 0.2],
        Emotion::Neutral => [0.4, 0.25, 0.1, 0.05, 0.2],
        Emotion::DangerQuestion => [0.6, 0.05, 0.2, 0.15, 0.0],
        Emotion::Explaining => [0.5, 0.3, 0.05, 0.0, 0.15],
        Emotion::Start => [0.3, 0.6, 0.0, 0.0, 0.1],
    }
}

const NEUTRAL: usize = 0;
const HAPPY: usize = 1;
const SAD: usize = 2;
const ANGRY: usize = 3;

/// 低能量阈值
const LOW_ENERGY: f64 = 30.0;
/// 高压力阈值
const HIGH_STRESS: f64 = 70.0;

/// 情感转移引擎
pub struct EmotionTransitionEngine {
    rng: Mutex<Box<dyn RngCore + Send>>,
    /// 跨会话的 (from, to) 转移计数
    stats: DashMap<(Emotion, Emotion), u64>,
}

impl EmotionTransitionEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            stats: DashMap::new(),
        }
    }

    /// 使用指定随机源创建（测试用）
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            stats: DashMap::new(),
        }
    }

    /// 采样前的归一化概率分布，与 `TARGETS` 同序
    pub fn distribution(
        &self,
        previous: Emotion,
        user_emotion: Emotion,
        state: &MentalState,
    ) -> [f64; 5] {
        let mut row = base_row(previous);

        // 疲れている時は中立に寄る
        if state.energy_level < LOW_ENERGY {
            row[NEUTRAL] += 0.2;
            row[HAPPY] = (row[HAPPY] - 0.1).max(0.0);
        }

        // ストレスが高い時は怒りやすい
        if state.stress_level > HIGH_STRESS {
            row[ANGRY] += 0.1;
            row[HAPPY] = (row[HAPPY] - 0.1).max(0.0);
        }

        match user_emotion {
            Emotion::Happy => {
                row[HAPPY] = (row[HAPPY] + 0.2).min(1.0);
            }
            Emotion::Sad => {
                row[SAD] = (row[SAD] + 0.1).min(1.0);
                row[NEUTRAL] = (row[NEUTRAL] + 0.1).min(1.0);
            }
            _ => {}
        }

        let total: f64 = row.iter().sum();
        if total > 0.0 {
            for value in &mut row {
                *value /= total;
            }
        } else {
            // 退化行の保険：中立のみ
            row = [1.0, 0.0, 0.0, 0.0, 0.0];
        }
        row
    }

    /// 计算下一个显示情感并记录转移统计
    pub fn next(&self, previous: Emotion, user_emotion: Emotion, state: &MentalState) -> Emotion {
        let next = if user_emotion.is_forced() {
            user_emotion
        } else {
            let distribution = self.distribution(previous, user_emotion, state);
            let r: f64 = {
                let mut guard = self.rng.lock();
                (&mut **guard).gen_range(0.0..1.0)
            };
            let mut cumulative = 0.0;
            let mut chosen = *TARGETS.last().unwrap_or(&Emotion::Neutral);
            for (i, probability) in distribution.iter().enumerate() {
                cumulative += probability;
                if r < cumulative {
                    chosen = TARGETS[i];
                    break;
                }
            }
            chosen
        };

        *self.stats.entry((previous, next)).or_insert(0) += 1;
        next
    }

    /// 跨会话转移矩阵（统计用）
    pub fn transition_matrix(&self) -> HashMap<String, HashMap<String, u64>> {
        let mut matrix: HashMap<String, HashMap<String, u64>> = HashMap::new();
        for entry in self.stats.iter() {
            let ((from, to), count) = (*entry.key(), *entry.value());
            matrix
                .entry(from.label().to_string())
                .or_default()
                .insert(to.label().to_string(), count);
        }
        matrix
    }
}

impl Default for EmotionTransitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    fn engine() -> EmotionTransitionEngine {
        EmotionTransitionEngine::with_rng(ChaCha8Rng::seed_from_u64(42))
    }

    #[rstest]
    #[case(Emotion::Neutral)]
    #[case(Emotion::Happy)]
    #[case(Emotion::Sad)]
    #[case(Emotion::Angry)]
    #[case(Emotion::Surprised)]
    #[case(Emotion::DangerQuestion)]
    #[case(Emotion::Explaining)]
    #[case(Emotion::Start)]
    fn test_distribution_sums_to_one(#[case] previous: Emotion) {
        let state = MentalState::default();
        let distribution = engine().distribution(previous, Emotion::Neutral, &state);
        let total: f64 = distribution.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "sum = {}", total);
        assert!(distribution.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_forced_emotions_pass_through() {
        let state = MentalState::default();
        let e = engine();
        assert_eq!(
            e.next(Emotion::Happy, Emotion::DangerQuestion, &state),
            Emotion::DangerQuestion
        );
        assert_eq!(
            e.next(Emotion::Sad, Emotion::Explaining, &state),
            Emotion::Explaining
        );
    }

    #[test]
    fn test_user_happy_raises_happy_probability() {
        let state = MentalState::default();
        let e = engine();
        let base = e.distribution(Emotion::Neutral, Emotion::Neutral, &state);
        let boosted = e.distribution(Emotion::Neutral, Emotion::Happy, &state);
        assert!(boosted[HAPPY] > base[HAPPY]);
    }

    #[test]
    fn test_low_energy_favors_neutral() {
        let mut state = MentalState::default();
        state.energy_level = 10.0;
        let e = engine();
        let tired = e.distribution(Emotion::Happy, Emotion::Neutral, &state);
        let rested = e.distribution(Emotion::Happy, Emotion::Neutral, &MentalState::default());
        assert!(tired[NEUTRAL] > rested[NEUTRAL]);
        assert!(tired[HAPPY] < rested[HAPPY]);
    }

    #[test]
    fn test_high_stress_favors_angry() {
        let mut state = MentalState::default();
        state.stress_level = 85.0;
        let e = engine();
        let stressed = e.distribution(Emotion::Neutral, Emotion::Neutral, &state);
        let calm = e.distribution(Emotion::Neutral, Emotion::Neutral, &MentalState::default());
        assert!(stressed[ANGRY] > calm[ANGRY]);
    }

    #[test]
    fn test_sampling_only_yields_targets() {
        let state = MentalState::default();
        let e = engine();
        for _ in 0..500 {
            let next = e.next(Emotion::Neutral, Emotion::Neutral, &state);
            assert!(TARGETS.contains(&next));
        }
    }

    #[test]
    fn test_transition_stats_recorded() {
        let state = MentalState::default();
        let e = engine();
        e.next(Emotion::Neutral, Emotion::DangerQuestion, &state);
        let matrix = e.transition_matrix();
        assert_eq!(matrix["neutral"]["dangerquestion"], 1);
    }

    #[test]
    fn test_deterministic_with_seeded_rng() {
        let state = MentalState::default();
        let a = EmotionTransitionEngine::with_rng(ChaCha8Rng::seed_from_u64(7));
        let b = EmotionTransitionEngine::with_rng(ChaCha8Rng::seed_from_u64(7));
        for _ in 0..50 {
            assert_eq!(
                a.next(Emotion::Neutral, Emotion::Neutral, &state),
                b.next(Emotion::Neutral, Emotion::Neutral, &state)
            );
        }
    }
}
