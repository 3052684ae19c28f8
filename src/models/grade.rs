//! 成绩报告模型与结构校验
//!
//! 生成器的回复是不可信文本。这里先按已知结构逐层校验 `serde_json::Value`，
//! 要么得到完整的类型化报告，要么得到第一个失败位置，不会产生半成品。
//! 数值本身（如 150 分）不做范围修正。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShapeError;

/// 单题成绩
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGrade {
    pub question_number: i64,
    pub grade: i64,
}

/// 单个学生的成绩
///
/// `overall_score` 由生成器直接给出，不要求等于各题平均。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReport {
    #[serde(rename = "student")]
    pub submitter_label: String,
    pub grades: Vec<QuestionGrade>,
    pub overall_score: i64,
}

/// 成绩报告，顺序与生成器回复一致
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeReport(pub Vec<StudentReport>);

impl GradeReport {
    /// 按成绩报告结构校验 JSON 值
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let items = value
            .as_array()
            .ok_or_else(|| ShapeError::new("$", "JSON 数组", kind_of(Some(value))))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_student(item, &format!("$[{}]", i)))
            .collect::<Result<Vec<_>, _>>()
            .map(GradeReport)
    }

    pub fn students(&self) -> &[StudentReport] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 所有学生的总分，供统计使用
    pub fn overall_scores(&self) -> Vec<i64> {
        self.0.iter().map(|s| s.overall_score).collect()
    }
}

fn parse_student(value: &Value, path: &str) -> Result<StudentReport, ShapeError> {
    let obj = as_object(value, path)?;

    let submitter_label = string(obj, path, "student")?;

    let grades_path = format!("{}.grades", path);
    let grades = obj
        .get("grades")
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError::new(&grades_path, "数组", kind_of(obj.get("grades"))))?
        .iter()
        .enumerate()
        .map(|(j, g)| parse_question_grade(g, &format!("{}[{}]", grades_path, j)))
        .collect::<Result<Vec<_>, _>>()?;

    let overall_score = integer(obj, path, "overall_score")?;

    Ok(StudentReport {
        submitter_label,
        grades,
        overall_score,
    })
}

fn parse_question_grade(value: &Value, path: &str) -> Result<QuestionGrade, ShapeError> {
    let obj = as_object(value, path)?;
    Ok(QuestionGrade {
        question_number: integer(obj, path, "question_number")?,
        grade: integer(obj, path, "grade")?,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ShapeError> {
    value
        .as_object()
        .ok_or_else(|| ShapeError::new(path, "对象", kind_of(Some(value))))
}

fn string(obj: &Map<String, Value>, path: &str, key: &str) -> Result<String, ShapeError> {
    let value = obj.get(key);
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ShapeError::new(format!("{}.{}", path, key), "字符串", kind_of(value)))
}

fn integer(obj: &Map<String, Value>, path: &str, key: &str) -> Result<i64, ShapeError> {
    let value = obj.get(key);
    value
        .and_then(Value::as_i64)
        .ok_or_else(|| ShapeError::new(format!("{}.{}", path, key), "整数", kind_of(value)))
}

fn kind_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "缺失",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "布尔值",
        Some(Value::Number(n)) if n.is_i64() => "整数",
        Some(Value::Number(_)) => "非整数数字",
        Some(Value::String(_)) => "字符串",
        Some(Value::Array(_)) => "数组",
        Some(Value::Object(_)) => "对象",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_report() {
        let value = json!([
            {
                "student": "alice.pdf",
                "grades": [
                    { "question_number": 1, "grade": 90 },
                    { "question_number": 2, "grade": 70 }
                ],
                "overall_score": 80
            },
            { "student": "bob.pdf", "grades": [], "overall_score": 55, "comment": "ignored" }
        ]);

        let report = GradeReport::from_value(&value).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report.students()[0].submitter_label, "alice.pdf");
        assert_eq!(report.students()[0].grades[1].grade, 70);
        assert_eq!(report.overall_scores(), vec![80, 55]);
    }

    #[test]
    fn test_top_level_must_be_array() {
        let err = GradeReport::from_value(&json!({ "student": "a" })).unwrap_err();
        assert_eq!(err, ShapeError::new("$", "JSON 数组", "对象"));
    }

    #[test]
    fn test_missing_overall_score_reports_path() {
        let value = json!([
            { "student": "a", "grades": [], "overall_score": 70 },
            { "student": "b", "grades": [] }
        ]);
        let err = GradeReport::from_value(&value).unwrap_err();
        assert_eq!(err.path, "$[1].overall_score");
        assert_eq!(err.found, "缺失");
    }

    #[test]
    fn test_nested_grade_type_checked() {
        let value = json!([
            { "student": "a", "grades": [{ "question_number": 1, "grade": "A+" }], "overall_score": 95 }
        ]);
        let err = GradeReport::from_value(&value).unwrap_err();
        assert_eq!(err.path, "$[0].grades[0].grade");
        assert_eq!(err.found, "字符串");
    }

    #[test]
    fn test_fractional_score_rejected() {
        let value = json!([{ "student": "a", "grades": [], "overall_score": 72.5 }]);
        let err = GradeReport::from_value(&value).unwrap_err();
        assert_eq!(err.found, "非整数数字");
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let value = json!([
            { "student": "a", "grades": [{ "question_number": 9, "grade": -5 }], "overall_score": 150 }
        ]);
        let report = GradeReport::from_value(&value).unwrap();
        assert_eq!(report.overall_scores(), vec![150]);
        assert_eq!(report.students()[0].grades[0].grade, -5);
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let report = GradeReport(vec![StudentReport {
            submitter_label: "a.pdf".to_string(),
            grades: vec![QuestionGrade {
                question_number: 1,
                grade: 100,
            }],
            overall_score: 100,
        }]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value[0]["student"], "a.pdf");
        assert_eq!(value[0]["grades"][0]["question_number"], 1);
    }
}
