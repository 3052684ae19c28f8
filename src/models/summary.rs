use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 等级档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 5] = [
        LetterGrade::A,
        LetterGrade::B,
        LetterGrade::C,
        LetterGrade::D,
        LetterGrade::F,
    ];

    /// A ≥ 90, B ≥ 80, C ≥ 70, D ≥ 60, 其余为 F
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 90 => LetterGrade::A,
            s if s >= 80 => LetterGrade::B,
            s if s >= 70 => LetterGrade::C,
            s if s >= 60 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

/// 统计摘要，所有数值保留两位小数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub average: f64,
    pub median: f64,
    pub std_dev: f64,
    /// 五个档位始终存在，值为百分比
    pub grade_distribution: BTreeMap<LetterGrade, f64>,
}
