//! 提示词构建 - 业务能力层
//!
//! 纯函数：相同输入必然得到逐字节相同的提示词。提示词会随项目一起保存，
//! 之后需要靠它复现或解释某次评分。

use crate::models::{GradingMode, ProjectConfig, ReferenceMaterial, Submission};

/// 开放题 / 作业在没有参考答案时的占位文本
pub const NO_SOLUTION_SENTINEL: &str =
    "[NO SOLUTION GIVEN - no reference provided, use your own general knowledge]";

/// 选择题在没有答案表时的占位文本
pub const NO_ANSWER_KEY_SENTINEL: &str =
    "[NO ANSWER KEY PROVIDED - no reference provided, use your own general knowledge]";

const OUTPUT_CONTRACT: &str = r#"Return the result as a JSON array with exactly one object per student, in this format:
[
  {
    "student": "<the label written after STUDENT:, copied exactly>",
    "grades": [{ "question_number": <int>, "grade": <int> }],
    "overall_score": <int between 0 and 100>
  }
]
Output ONLY this JSON array. Do not add explanations, markdown or code fences."#;

/// 构建评分提示词
///
/// 答卷按输入顺序追加在说明之后，每份以 `STUDENT: <label>` 开头。
pub fn build_prompt(
    mode: GradingMode,
    subject: &str,
    question_count: u32,
    reference: Option<&ReferenceMaterial>,
    expected_average: Option<u8>,
    submissions: &[Submission],
) -> String {
    let reference_text = reference.filter(|r| !r.is_blank()).map(ReferenceMaterial::text);
    let target = target_average_instruction(expected_average);
    let points = format!("{:.2}", 100.0 / f64::from(question_count.max(1)));

    let instructions = match mode {
        GradingMode::Open => format!(
            r#"You are an intelligent and objective exam grader. The exam type is: OPEN QUESTIONS.

Subject: {subject}
Number of questions: {question_count}

Reference solution:
{reference}

Grade every answer of every student on a scale from 0 to 100, using your knowledge of the subject to judge correctness and completeness.
{target}
"#,
            reference = reference_text.unwrap_or(NO_SOLUTION_SENTINEL),
        ),
        GradingMode::MultipleChoice => format!(
            r#"You are a strict grader for MULTIPLE CHOICE exams.

Subject: {subject}
Number of questions: {question_count}

Correct answers:
{reference}

Mark each answer as correct (1) or incorrect (0). Each question is worth 100 / {question_count} = {points} points, so report a correct answer as {points} rounded to an integer and an incorrect one as 0.
When an answer key is given above, follow it strictly and do not accept alternatives it does not list.
{target}
"#,
            reference = reference_text.unwrap_or(NO_ANSWER_KEY_SENTINEL),
        ),
        GradingMode::Homework => format!(
            r#"You are a fair grader for HOMEWORK assignments.

Subject: {subject}
Number of questions: {question_count}

Reference solution:
{reference}

Grade every question from 0 to 100. Be fair, but noticeably more lenient than in an exam: give partial credit for reasonable attempts and minor mistakes.
{target}
"#,
            reference = reference_text.unwrap_or(NO_SOLUTION_SENTINEL),
        ),
    };

    let student_blocks = submissions
        .iter()
        .map(|s| format!("STUDENT: {}\n{}", s.label, s.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n{}\n\n{}", instructions, OUTPUT_CONTRACT, student_blocks)
}

/// 按项目配置构建提示词
pub fn build_prompt_for(
    config: &ProjectConfig,
    reference: Option<&ReferenceMaterial>,
    submissions: &[Submission],
) -> String {
    build_prompt(
        config.mode,
        &config.subject,
        config.question_count,
        reference,
        config.expected_average,
        submissions,
    )
}

fn target_average_instruction(expected_average: Option<u8>) -> String {
    match expected_average {
        Some(avg) => format!(
            "If needed, adjust the grading so that the class average is approximately {} (within about 10%). This is a soft target, not a hard constraint.",
            avg
        ),
        None => "There is no target average: let the grades follow their natural distribution.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submissions() -> Vec<Submission> {
        vec![
            Submission::new("alice.pdf", "1) F = ma\n2) 9.8 m/s^2"),
            Submission::new("bob.pdf", ""),
        ]
    }

    #[test]
    fn test_prompt_is_deterministic_for_every_mode() {
        let reference = ReferenceMaterial::new("1) Newton's second law");
        for mode in GradingMode::ALL {
            let a = build_prompt(mode, "Physics", 2, Some(&reference), Some(80), &submissions());
            let b = build_prompt(mode, "Physics", 2, Some(&reference), Some(80), &submissions());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_modes_use_different_templates() {
        let open = build_prompt(GradingMode::Open, "Math", 3, None, None, &submissions());
        let mc = build_prompt(GradingMode::MultipleChoice, "Math", 3, None, None, &submissions());
        let hw = build_prompt(GradingMode::Homework, "Math", 3, None, None, &submissions());

        assert!(open.contains("OPEN QUESTIONS"));
        assert!(mc.contains("correct (1) or incorrect (0)"));
        assert!(mc.contains("100 / 3 = 33.33 points"));
        assert!(hw.contains("more lenient"));
        assert_ne!(open, hw);
    }

    #[test]
    fn test_embeds_subject_count_and_reference() {
        let reference = ReferenceMaterial::new("1. B\n2. D");
        let prompt = build_prompt(
            GradingMode::MultipleChoice,
            "History",
            2,
            Some(&reference),
            None,
            &submissions(),
        );
        assert!(prompt.contains("Subject: History"));
        assert!(prompt.contains("Number of questions: 2"));
        assert!(prompt.contains("1. B\n2. D"));
        assert!(!prompt.contains(NO_ANSWER_KEY_SENTINEL));
    }

    #[test]
    fn test_missing_or_blank_reference_uses_sentinel() {
        let blank = ReferenceMaterial::new("   ");
        let prompt = build_prompt(GradingMode::Open, "Biology", 4, Some(&blank), None, &[]);
        assert!(prompt.contains(NO_SOLUTION_SENTINEL));

        let prompt = build_prompt(GradingMode::MultipleChoice, "Biology", 4, None, None, &[]);
        assert!(prompt.contains(NO_ANSWER_KEY_SENTINEL));
    }

    #[test]
    fn test_target_average_is_soft() {
        let with_target = build_prompt(GradingMode::Homework, "Art", 1, None, Some(75), &[]);
        assert!(with_target.contains("approximately 75 (within about 10%)"));
        assert!(with_target.contains("soft target"));

        let natural = build_prompt(GradingMode::Homework, "Art", 1, None, None, &[]);
        assert!(natural.contains("natural distribution"));
    }

    #[test]
    fn test_output_contract_and_submission_order() {
        let prompt = build_prompt(GradingMode::Open, "Physics", 2, None, None, &submissions());
        assert!(prompt.contains("\"overall_score\""));
        assert!(prompt.contains("\"question_number\""));
        assert!(prompt.contains("Output ONLY this JSON array"));

        let alice = prompt.find("STUDENT: alice.pdf").unwrap();
        let bob = prompt.find("STUDENT: bob.pdf").unwrap();
        let contract = prompt.find("Output ONLY").unwrap();
        assert!(contract < alice);
        assert!(alice < bob);
        assert!(prompt.ends_with("STUDENT: bob.pdf\n"));
    }
}
