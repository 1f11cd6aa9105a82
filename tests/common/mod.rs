#![allow(dead_code)]

use rust_exam_ledger::config::DatabaseConfig;
use rust_exam_ledger::models::exams::entities::{Exam, Subject};
use rust_exam_ledger::models::exams::requests::NewExam;
use rust_exam_ledger::models::results::entities::ExamResult;
use rust_exam_ledger::models::students::entities::{NewStudent, Student};
use rust_exam_ledger::sheet::{ColumnMapping, RawSheet, SheetRow, normalize_rows};
use rust_exam_ledger::storage::{SeaOrmStorage, Storage};

/// 迁移完毕的内存数据库
pub async fn setup_storage() -> SeaOrmStorage {
    SeaOrmStorage::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    })
    .await
    .expect("in-memory storage")
}

pub async fn seed_subjects(storage: &SeaOrmStorage, names: &[&str]) -> Vec<Subject> {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    storage.ensure_subjects(&names).await.expect("seed subjects")
}

pub async fn seed_exam(
    storage: &SeaOrmStorage,
    name: &str,
    class_ids: &[i64],
    subjects: &[Subject],
) -> Exam {
    let subject_ids: Vec<i64> = subjects.iter().map(|s| s.id).collect();
    storage
        .create_exam(
            NewExam {
                name: name.to_string(),
                exam_date: "2025-03-01".to_string(),
            },
            class_ids,
            &subject_ids,
        )
        .await
        .expect("seed exam")
}

/// 创建学生并分入班级
pub async fn seed_member(
    storage: &SeaOrmStorage,
    class_id: i64,
    name: &str,
    roll_number: &str,
) -> Student {
    let student = storage
        .create_student(NewStudent {
            name: name.to_string(),
            father_name: None,
            roll_number: Some(roll_number.to_string()),
        })
        .await
        .expect("seed student");
    storage
        .enroll_student(student.id, class_id, roll_number)
        .await
        .expect("enroll student");
    student
}

pub fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
    ColumnMapping::from_headers(pairs.iter().copied())
}

pub fn rows(lines: &[&[&str]], mapping: &ColumnMapping) -> Vec<SheetRow> {
    normalize_rows(&RawSheet::from_text_rows(lines.iter().copied()), mapping)
}

pub fn result_for<'a>(results: &'a [ExamResult], roll_number: &str) -> &'a ExamResult {
    results
        .iter()
        .find(|r| r.roll_number == roll_number)
        .unwrap_or_else(|| panic!("no result for roll number {roll_number}"))
}

pub fn subject_id(subjects: &[Subject], name: &str) -> i64 {
    subjects
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.id)
        .unwrap_or_else(|| panic!("no subject {name}"))
}
