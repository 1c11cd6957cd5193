//! 心理状态模拟器
//!
//! 维护全进程唯一的一份角色深层心理状态，每轮对话按
//! 时间段系数、用户情感增量、话题加成与疲劳累积演化。
//! 所有会话共享同一个角色内心，演化顺序固定：
//! 时间段 → 情感增量 → 话题加成 → 疲劳 → 疲劳过载补正 → 夹取。

use parking_lot::Mutex;

use crate::models::emotion::Emotion;
use crate::models::mental_state::MentalState;

/// 一天中的时间段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// 时间段气分系数
struct TimeModifiers {
    energy: f64,
    #[allow(dead_code)]
    patience: f64,
    #[allow(dead_code)]
    creativity: f64,
}

impl TimeBand {
    /// 从本地小时判定时间段
    pub fn from_hour(hour: u32) -> TimeBand {
        match hour {
            6..=11 => TimeBand::Morning,
            12..=17 => TimeBand::Afternoon,
            18..=21 => TimeBand::Evening,
            _ => TimeBand::Night,
        }
    }

    /// 当前时间段
    pub fn current() -> TimeBand {
        use chrono::Timelike;
        TimeBand::from_hour(chrono::Local::now().hour())
    }

    // 各时间段的系数表。目前只有能量系数参与演化，
    // 耐心与创造力系数保留在表中以固定数值来源。
    fn modifiers(&self) -> TimeModifiers {
        match self {
            TimeBand::Morning => TimeModifiers {
                energy: 0.9,
                patience: 1.1,
                creativity: 1.0,
            },
            TimeBand::Afternoon => TimeModifiers {
                energy: 1.0,
                patience: 0.9,
                creativity: 1.2,
            },
            TimeBand::Evening => TimeModifiers {
                energy: 0.7,
                patience: 0.8,
                creativity: 0.9,
            },
            TimeBand::Night => TimeModifiers {
                energy: 0.5,
                patience: 0.7,
                creativity: 0.8,
            },
        }
    }
}

/// 触发创造力/满意度加成的话题词
static TOPIC_KEYWORDS: &[&str] = &["友禅", "のりおき", "yuzen", "norioki"];

/// 文本中命中的话题词（会话的话题发现记录也用它）
pub fn topics_in(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(*k))
        .collect()
}

/// 疲劳过载阈值
const FATIGUE_OVERLOAD: f64 = 70.0;
/// 疲劳过载时能量下限
const ENERGY_FLOOR: f64 = 20.0;
/// 疲劳过载时耐心下限
const PATIENCE_FLOOR: f64 = 30.0;

/// 心理状态模拟器
pub struct MentalStateSimulator {
    state: Mutex<MentalState>,
}

impl MentalStateSimulator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MentalState::default()),
        }
    }

    /// 从给定初始状态创建（测试用）
    pub fn with_state(initial: MentalState) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> MentalState {
        self.state.lock().clone()
    }

    /// 按一轮对话演化状态并返回演化后的快照
    pub fn update(&self, user_emotion: Emotion, topic: &str, band: TimeBand) -> MentalState {
        let mut state = self.state.lock();

        state.energy_level *= band.modifiers().energy;

        match user_emotion {
            Emotion::Happy => {
                state.energy_level += 5.0;
                state.work_satisfaction += 2.0;
                state.loneliness -= 5.0;
            }
            Emotion::Sad => {
                // 共感モードに入る
                state.openness += 10.0;
                state.patience += 5.0;
            }
            Emotion::Angry => {
                state.stress_level += 10.0;
                state.patience -= 5.0;
            }
            Emotion::DangerQuestion => {
                state.stress_level += 15.0;
                state.patience -= 10.0;
                state.openness -= 20.0;
            }
            Emotion::Explaining => {
                state.creativity += 5.0;
                state.work_satisfaction += 3.0;
            }
            Emotion::Neutral | Emotion::Surprised | Emotion::Start => {}
        }

        if !topics_in(topic).is_empty() {
            state.creativity += 3.0;
            state.work_satisfaction += 2.0;
        }

        state.physical_fatigue += 2.0;

        // 疲労が溜まるとエネルギーと忍耐が削られるが、底値は保証される
        if state.physical_fatigue > FATIGUE_OVERLOAD {
            state.energy_level = (state.energy_level - 10.0).max(ENERGY_FLOOR);
            state.patience = (state.patience - 10.0).max(PATIENCE_FLOOR);
        }

        state.clamp_all();
        state.clone()
    }
}

impl Default for MentalStateSimulator {
    fn default() -> Self {
        Self::new()
    }
}
