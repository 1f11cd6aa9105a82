use crate::errors::{ExamLedgerError, Result};
use crate::models::exams::entities::Subject;
use crate::sheet::{ColumnMapping, IDENTITY_FIELDS, normalize_header};

const MATH_ALIASES: [&str; 2] = ["math", "mathematics"];

/// 逻辑字段 → 科目 的解析结果，每批构建一次后只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectColumns {
    columns: Vec<(String, Subject)>,
}

impl SubjectColumns {
    /// 按顺序尝试：字段名精确匹配、表头精确匹配、双向包含匹配
    ///
    /// 没有任何列匹配到科目时整批失败。
    pub fn resolve(subjects: &[Subject], mapping: &ColumnMapping) -> Result<Self> {
        let lookup = build_lookup(subjects);
        let mut columns = Vec::new();

        for column in mapping.columns() {
            if IDENTITY_FIELDS.contains(&column.field.as_str()) {
                continue;
            }

            let field = column.field.trim().to_lowercase();
            let header = normalize_header(&column.header);

            let matched = exact(&lookup, &field)
                .or_else(|| exact(&lookup, &header))
                .or_else(|| fuzzy(&lookup, &field, &header));

            if let Some(subject) = matched {
                tracing::debug!(
                    "Column '{}' ({}) resolved to subject '{}'",
                    column.header,
                    column.field,
                    subject.name
                );
                columns.push((column.field.clone(), subject.clone()));
            }
        }

        if columns.is_empty() {
            let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
            return Err(ExamLedgerError::subject_mapping(format!(
                "No upload columns matched any subject. Available subjects: {}",
                names.join(", ")
            )));
        }

        Ok(Self { columns })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Subject)> {
        self.columns.iter().map(|(field, s)| (field.as_str(), s))
    }

    pub fn subject_for(&self, field: &str) -> Option<&Subject> {
        self.columns
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, s)| s)
    }

    /// 去重后的科目列表
    pub fn subjects(&self) -> Vec<Subject> {
        let mut subjects: Vec<Subject> = Vec::new();
        for (_, subject) in &self.columns {
            if !subjects.iter().any(|s| s.id == subject.id) {
                subjects.push(subject.clone());
            }
        }
        subjects
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 小写科目名 → 科目，含 math 别名；保持科目顺序
fn build_lookup(subjects: &[Subject]) -> Vec<(String, &Subject)> {
    let mut lookup: Vec<(String, &Subject)> = subjects
        .iter()
        .map(|s| (s.name.trim().to_lowercase(), s))
        .collect();

    for subject in subjects {
        if subject.name.to_lowercase().contains("math") {
            for alias in MATH_ALIASES {
                if !lookup.iter().any(|(key, _)| key == alias) {
                    lookup.push((alias.to_string(), subject));
                }
            }
        }
    }

    lookup
}

fn exact<'a>(lookup: &[(String, &'a Subject)], key: &str) -> Option<&'a Subject> {
    lookup.iter().find(|(name, _)| name == key).map(|(_, s)| *s)
}

fn fuzzy<'a>(lookup: &[(String, &'a Subject)], field: &str, header: &str) -> Option<&'a Subject> {
    let overlaps = |a: &str, b: &str| !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a));
    lookup
        .iter()
        .find(|(name, _)| overlaps(field, name) || overlaps(header, name))
        .map(|(_, s)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects() -> Vec<Subject> {
        vec![
            Subject {
                id: 1,
                name: "Physics".to_string(),
            },
            Subject {
                id: 2,
                name: "Chemistry".to_string(),
            },
            Subject {
                id: 3,
                name: "Mathematics".to_string(),
            },
        ]
    }

    #[test]
    fn test_exact_field_match_wins() {
        let mapping = ColumnMapping::from_headers([
            ("Roll No", "roll_number"),
            ("Math Score", "mathematics"),
            ("PHY", "physics"),
        ]);
        let columns = SubjectColumns::resolve(&subjects(), &mapping).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.subject_for("mathematics").map(|s| s.id), Some(3));
        assert_eq!(columns.subject_for("physics").map(|s| s.id), Some(1));
        assert!(columns.subject_for("roll_number").is_none());
    }

    #[test]
    fn test_header_and_fuzzy_matches() {
        let mapping = ColumnMapping::from_headers([
            ("Chemistry", "col_b"),
            ("Marks", "physics_marks"),
            ("Maths", "math"),
        ]);
        let columns = SubjectColumns::resolve(&subjects(), &mapping).unwrap();
        assert_eq!(columns.subject_for("col_b").map(|s| s.id), Some(2));
        assert_eq!(columns.subject_for("physics_marks").map(|s| s.id), Some(1));
        assert_eq!(columns.subject_for("math").map(|s| s.id), Some(3));
        assert_eq!(columns.subjects().len(), 3);
    }

    #[test]
    fn test_no_matching_columns_fails() {
        let mapping =
            ColumnMapping::from_headers([("Roll", "roll_number"), ("Name", "name"), ("Bio", "biology")]);
        let err = SubjectColumns::resolve(&subjects(), &mapping).unwrap_err();
        assert!(matches!(err, ExamLedgerError::SubjectMapping(_)));
        assert!(err.message().contains("Physics"));
    }

    #[test]
    fn test_math_alias_does_not_override_real_subject() {
        let subjects = vec![
            Subject {
                id: 7,
                name: "Math".to_string(),
            },
            Subject {
                id: 8,
                name: "Applied Mathematics".to_string(),
            },
        ];
        let mapping = ColumnMapping::from_headers([("M", "math")]);
        let columns = SubjectColumns::resolve(&subjects, &mapping).unwrap();
        assert_eq!(columns.subject_for("math").map(|s| s.id), Some(7));
    }
}
