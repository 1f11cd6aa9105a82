mod common;

use common::*;
use rust_exam_ledger::errors::ExamLedgerError;
use rust_exam_ledger::models::results::entities::ResultStatus;
use rust_exam_ledger::storage::Storage;

const MARKS_MAPPING: &[(&str, &str)] = &[
    ("Roll No", "roll_number"),
    ("Physics", "physics"),
    ("Chemistry", "chemistry"),
];

#[tokio::test]
async fn test_midterm_scenario() {
    let storage = setup_storage().await;
    let class = storage.create_class("10A").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Midterm", &[class.id], &subjects).await;
    for (name, roll) in [("Asha", "101"), ("Bilal", "102"), ("Chen", "103")] {
        seed_member(&storage, class.id, name, roll).await;
    }

    let mapping = mapping(MARKS_MAPPING);
    let rows = rows(
        &[
            &["Roll No", "Physics", "Chemistry"],
            &["101", "80", "70"],
            &["102", "", ""],
        ],
        &mapping,
    );

    let summary = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();
    // 整行空白的 102 计入 processed，但不计入 absent_marked
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.absent_marked, 1);
    assert!(summary.unmapped.is_empty());
    assert!(summary.errors.is_empty());

    let results = storage.list_exam_results(exam.id).await.unwrap();
    assert_eq!(results.len(), 3);

    let r101 = result_for(&results, "101");
    assert_eq!(r101.status, ResultStatus::Present);
    assert_eq!(r101.total, 150.0);
    assert_eq!(r101.average, 75.0);
    assert_eq!(r101.mark_for(subject_id(&subjects, "Physics")), Some(80.0));

    for roll in ["102", "103"] {
        let result = result_for(&results, roll);
        assert_eq!(result.status, ResultStatus::Absent, "{roll}");
        assert_eq!(result.total, 0.0);
        assert_eq!(result.average, 0.0);
        assert_eq!(result.marks.len(), 2);
        assert!(result.marks.iter().all(|m| m.marks.is_none()));
    }
}

#[tokio::test]
async fn test_reupload_is_idempotent() {
    let storage = setup_storage().await;
    let class = storage.create_class("10B").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Finals", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Dara", "201").await;
    seed_member(&storage, class.id, "Eli", "202").await;

    let mapping = mapping(MARKS_MAPPING);
    let rows = rows(
        &[&["Roll No", "Physics", "Chemistry"], &["201", "55", "65"]],
        &mapping,
    );

    let first = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();
    assert_eq!(first.absent_marked, 1);
    let before = storage.list_exam_results(exam.id).await.unwrap();

    let second = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();
    assert_eq!(second.processed, 1);
    // 202 第一次已补建缺考记录
    assert_eq!(second.absent_marked, 0);

    let after = storage.list_exam_results(exam.id).await.unwrap();
    assert_eq!(after.len(), before.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.total, b.total);
        assert_eq!(a.status, b.status);
        assert_eq!(a.marks.len(), b.marks.len());
    }
}

#[tokio::test]
async fn test_duplicate_roll_number_last_row_wins() {
    let storage = setup_storage().await;
    let class = storage.create_class("9C").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Quiz", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Farah", "301").await;

    let mapping = mapping(MARKS_MAPPING);
    let rows = rows(
        &[
            &["Roll No", "Physics", "Chemistry"],
            &["301", "10", "20"],
            &[" 30 1 ", "90", ""],
        ],
        &mapping,
    );

    storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();

    let results = storage.list_exam_results(exam.id).await.unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.mark_for(subject_id(&subjects, "Physics")), Some(90.0));
    assert_eq!(result.mark_for(subject_id(&subjects, "Chemistry")), None);
    assert_eq!(result.total, 90.0);
    assert_eq!(result.average, 90.0);
}

#[tokio::test]
async fn test_zero_and_negative_marks_count() {
    let storage = setup_storage().await;
    let class = storage.create_class("8A").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Penalty", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Gus", "401").await;

    let mapping = mapping(MARKS_MAPPING);
    let rows = rows(
        &[&["Roll No", "Physics", "Chemistry"], &["401", "0", "-5"]],
        &mapping,
    );

    storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();

    let results = storage.list_exam_results(exam.id).await.unwrap();
    let result = result_for(&results, "401");
    assert_eq!(result.status, ResultStatus::Present);
    assert_eq!(result.total, -5.0);
    assert_eq!(result.average, -2.5);
}

#[tokio::test]
async fn test_math_score_column_resolves_to_mathematics() {
    let storage = setup_storage().await;
    let class = storage.create_class("7A").await.unwrap();
    let subjects = seed_subjects(&storage, &["Mathematics"]).await;
    let exam = seed_exam(&storage, "Algebra", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Hana", "501").await;

    let mapping = mapping(&[("Roll No", "roll_number"), ("Math Score", "mathematics")]);
    let rows = rows(&[&["Roll No", "Math Score"], &["501", "88.5"]], &mapping);

    storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();

    let results = storage.list_exam_results(exam.id).await.unwrap();
    assert_eq!(
        result_for(&results, "501").mark_for(subject_id(&subjects, "Mathematics")),
        Some(88.5)
    );
}

#[tokio::test]
async fn test_columns_sharing_a_subject_keep_first_mark() {
    let storage = setup_storage().await;
    let class = storage.create_class("11C").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Lab Week", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Ivo", "601").await;
    seed_member(&storage, class.id, "Jun", "602").await;

    // 两列都模糊匹配到 Physics
    let mapping = mapping(&[
        ("Roll No", "roll_number"),
        ("Physics Theory", "physics_theory"),
        ("Physics Practical", "physics_practical"),
    ]);
    let rows = rows(
        &[
            &["Roll No", "Physics Theory", "Physics Practical"],
            &["601", "80", ""],
            &["602", "", "70"],
        ],
        &mapping,
    );

    let summary = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.absent_marked, 0);

    let physics = subject_id(&subjects, "Physics");
    let results = storage.list_exam_results(exam.id).await.unwrap();

    let r601 = result_for(&results, "601");
    assert_eq!(r601.status, ResultStatus::Present);
    assert_eq!(r601.mark_for(physics), Some(80.0));
    assert_eq!(r601.total, 80.0);
    assert_eq!(r601.average, 80.0);
    assert_eq!(
        r601.marks.iter().filter(|m| m.subject_id == physics).count(),
        1
    );

    let r602 = result_for(&results, "602");
    assert_eq!(r602.status, ResultStatus::Present);
    assert_eq!(r602.mark_for(physics), Some(70.0));
    assert_eq!(r602.total, 70.0);
}

#[tokio::test]
async fn test_unknown_roll_number_is_unmapped() {
    let storage = setup_storage().await;
    let class = storage.create_class("6A").await.unwrap();
    let other = storage.create_class("6B").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics"]).await;
    let exam = seed_exam(&storage, "Unit Test", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Ira", "601").await;
    // 只在其他班级存在的学号同样视为未匹配
    seed_member(&storage, other.id, "Jo", "602").await;

    let mapping = mapping(&[("Roll No", "roll_number"), ("Physics", "physics")]);
    let rows = rows(
        &[&["Roll No", "Physics"], &["601", "40"], &["602", "50"], &["999", "60"]],
        &mapping,
    );

    let summary = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.unmapped.len(), 2);
    assert_eq!(summary.unmapped[0].row, 3);
    assert_eq!(summary.unmapped[0].roll_number.as_deref(), Some("602"));
    assert_eq!(summary.unmapped[1].roll_number.as_deref(), Some("999"));
    assert_eq!(
        summary.unmapped[1].data.get("physics"),
        Some(&Some("60".to_string()))
    );
    assert!(summary.message(true).contains("Unmapped roll numbers: 602, 999"));
}

#[tokio::test]
async fn test_exam_without_subjects_fails() {
    let storage = setup_storage().await;
    let class = storage.create_class("5A").await.unwrap();
    let exam = seed_exam(&storage, "Empty", &[class.id], &[]).await;
    seed_member(&storage, class.id, "Kai", "701").await;

    let mapping = mapping(&[("Roll No", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll No", "Physics"], &["701", "40"]], &mapping);

    let err = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::ExamHasNoSubjects(_)));
    assert!(storage.list_exam_results(exam.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_matching_column_rolls_back_batch() {
    let storage = setup_storage().await;
    let class = storage.create_class("4A").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry"]).await;
    let exam = seed_exam(&storage, "Bio", &[class.id], &subjects).await;
    seed_member(&storage, class.id, "Lena", "801").await;

    let mapping = mapping(&[("Roll No", "roll_number"), ("Biology", "biology")]);
    let rows = rows(&[&["Roll No", "Biology"], &["801", "77"]], &mapping);

    let err = storage
        .process_exam_results(exam.id, class.id, &rows, &mapping)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::SubjectMapping(_)));
    // 缺考补全也不应留下记录
    assert!(storage.list_exam_results(exam.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_class_must_belong_to_exam() {
    let storage = setup_storage().await;
    let class = storage.create_class("3A").await.unwrap();
    let outsider = storage.create_class("3B").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics"]).await;
    let exam = seed_exam(&storage, "Scoped", &[class.id], &subjects).await;

    let mapping = mapping(&[("Roll No", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll No", "Physics"], &["901", "40"]], &mapping);

    let err = storage
        .process_exam_results(exam.id, outsider.id, &rows, &mapping)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::Validation(_)));

    let err = storage
        .process_exam_results(exam.id + 100, class.id, &rows, &mapping)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::NotFound(_)));
}

#[tokio::test]
async fn test_roll_number_mapping_required() {
    let storage = setup_storage().await;
    let class = storage.create_class("2A").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics"]).await;
    let exam = seed_exam(&storage, "NoRoll", &[class.id], &subjects).await;

    let mapping = mapping(&[("Physics", "physics")]);
    let err = storage
        .process_exam_results(exam.id, class.id, &[], &mapping)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::Validation(_)));
}

#[tokio::test]
async fn test_inactive_membership_is_not_matched() {
    let storage = setup_storage().await;
    let old_class = storage.create_class("1A").await.unwrap();
    let new_class = storage.create_class("1B").await.unwrap();
    let subjects = seed_subjects(&storage, &["Physics"]).await;
    let exam = seed_exam(&storage, "Moved", &[old_class.id], &subjects).await;

    let student = seed_member(&storage, old_class.id, "Mo", "111").await;
    // 转班后旧班学籍失效
    storage
        .enroll_student(student.id, new_class.id, "112")
        .await
        .unwrap();

    let mapping = mapping(&[("Roll No", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll No", "Physics"], &["111", "40"]], &mapping);

    let summary = storage
        .process_exam_results(exam.id, old_class.id, &rows, &mapping)
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.unmapped.len(), 1);
    // 旧班没有激活成员，不补缺考
    assert_eq!(summary.absent_marked, 0);
}
