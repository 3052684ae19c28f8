//! 成绩统计 - 业务能力层
//!
//! 纯函数，不假设分数范围；空输入一律返回 0.0。

use std::collections::BTreeMap;

use crate::models::{LetterGrade, StatisticsSummary};

/// 四舍五入到两位小数
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(scores: &[i64]) -> f64 {
    scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64
}

/// 算术平均
pub fn average(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    round2(mean(scores))
}

/// 中位数：偶数个时取中间两个的平均
pub fn median(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    let value = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };
    round2(value)
}

/// 总体标准差（除以 N）
pub fn std_dev(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let mean = mean(scores);
    let variance = scores
        .iter()
        .map(|&s| (s as f64 - mean).powi(2))
        .sum::<f64>()
        / scores.len() as f64;
    round2(variance.sqrt())
}

/// 各等级所占百分比，五个档位始终存在
pub fn grade_distribution(scores: &[i64]) -> BTreeMap<LetterGrade, f64> {
    let mut counts: BTreeMap<LetterGrade, usize> =
        LetterGrade::ALL.iter().map(|&g| (g, 0)).collect();

    for &score in scores {
        *counts.entry(LetterGrade::from_score(score)).or_default() += 1;
    }

    let total = scores.len();
    counts
        .into_iter()
        .map(|(grade, count)| {
            let share = if total == 0 {
                0.0
            } else {
                round2(count as f64 / total as f64 * 100.0)
            };
            (grade, share)
        })
        .collect()
}

/// 计算完整的统计摘要
pub fn summarize(scores: &[i64]) -> StatisticsSummary {
    StatisticsSummary {
        average: average(scores),
        median: median(scores),
        std_dev: std_dev(scores),
        grade_distribution: grade_distribution(scores),
    }
}
