//! 深层心理状态
//!
//! 角色的 8 维心理向量，取值范围 [0, 100]。整个进程只有一份实例，
//! 所有会话共享同一个角色的内心状态。

use serde::{Deserialize, Serialize};

/// 取值下界
pub const STATE_MIN: f64 = 0.0;
/// 取值上界
pub const STATE_MAX: f64 = 100.0;

/// 深层心理状态向量
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentalState {
    /// 能量水平
    pub energy_level: f64,
    /// 压力水平
    pub stress_level: f64,
    /// 心理开放度
    pub openness: f64,
    /// 耐心
    pub patience: f64,
    /// 创造力
    pub creativity: f64,
    /// 孤独感
    pub loneliness: f64,
    /// 工作满意度
    pub work_satisfaction: f64,
    /// 身体疲劳
    pub physical_fatigue: f64,
}

impl Default for MentalState {
    fn default() -> Self {
        Self {
            energy_level: 80.0,
            stress_level: 20.0,
            openness: 70.0,
            patience: 90.0,
            creativity: 85.0,
            loneliness: 30.0,
            work_satisfaction: 75.0,
            physical_fatigue: 20.0,
        }
    }
}

impl MentalState {
    /// 将所有字段夹取到 [0, 100]
    pub fn clamp_all(&mut self) {
        for value in [
            &mut self.energy_level,
            &mut self.stress_level,
            &mut self.openness,
            &mut self.patience,
            &mut self.creativity,
            &mut self.loneliness,
            &mut self.work_satisfaction,
            &mut self.physical_fatigue,
        ] {
            *value = value.clamp(STATE_MIN, STATE_MAX);
        }
    }

    /// 检查所有字段是否在合法范围内
    pub fn in_bounds(&self) -> bool {
        [
            self.energy_level,
            self.stress_level,
            self.openness,
            self.patience,
            self.creativity,
            self.loneliness,
            self.work_satisfaction,
            self.physical_fatigue,
        ]
        .iter()
        .all(|v| (STATE_MIN..=STATE_MAX).contains(v))
    }
}
