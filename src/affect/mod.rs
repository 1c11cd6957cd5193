//! 情感与心理模块
//!
//! 包含三个相互配合的子系统：
//! - `classifier`：从用户文本判定情感类别（规则优先级版）
//! - `weighted`：加权打分的备选分类策略，额外产出置信度
//! - `simulator`：角色深层心理状态的演化
//! - `transition`：基于概率状态机的显示情感转移

pub mod classifier;
pub mod simulator;
pub mod transition;
pub mod weighted;

pub use classifier::{create_classifier, EmotionClassifier, KeywordClassifier};
pub use simulator::{topics_in, MentalStateSimulator, TimeBand};
pub use transition::EmotionTransitionEngine;
pub use weighted::WeightedClassifier;
