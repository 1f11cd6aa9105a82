mod common;

use common::*;
use rust_exam_ledger::models::students::entities::NewStudent;
use rust_exam_ledger::storage::Storage;

const ROSTER_MAPPING: &[(&str, &str)] = &[
    ("Roll", "roll_number"),
    ("Student Name", "name"),
    ("Father", "father_name"),
];

#[tokio::test]
async fn test_roster_creates_and_updates_students() {
    let storage = setup_storage().await;
    storage
        .create_student(NewStudent {
            name: "Old Name".to_string(),
            father_name: Some("Dad".to_string()),
            roll_number: Some("R1".to_string()),
        })
        .await
        .unwrap();

    let mapping = mapping(ROSTER_MAPPING);
    let rows = rows(
        &[
            &["Roll", "Student Name", "Father"],
            &["R1", "New Name", ""],
            &["R2", "Fresh", "Pa"],
            &["R3", "", ""],
        ],
        &mapping,
    );

    let summary = storage.process_student_roster(&rows, None).await.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.assigned, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 4);

    let updated = storage.get_student_by_roll_number("R1").await.unwrap().unwrap();
    assert_eq!(updated.name, "New Name");
    // 空白父亲姓名不覆盖已有值
    assert_eq!(updated.father_name.as_deref(), Some("Dad"));

    let created = storage.get_student_by_roll_number("R2").await.unwrap().unwrap();
    assert_eq!(created.father_name.as_deref(), Some("Pa"));
    assert!(storage.get_student_by_roll_number("R3").await.unwrap().is_none());
}

#[tokio::test]
async fn test_roster_assigns_students_to_class() {
    let storage = setup_storage().await;
    let old_class = storage.create_class("10A").await.unwrap();
    let class = storage.create_class("11A").await.unwrap();
    let moved = seed_member(&storage, old_class.id, "Mover", "R4").await;

    let mapping = mapping(ROSTER_MAPPING);
    let rows = rows(
        &[
            &["Roll", "Student Name", "Father"],
            &["R4", "Mover", ""],
            &["R5", "Newcomer", ""],
        ],
        &mapping,
    );

    let summary = storage
        .process_student_roster(&rows, Some(class.id))
        .await
        .unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.assigned, 2);
    assert!(summary.message().contains("Assigned 2 students to class."));

    let memberships = storage.list_student_memberships(moved.id).await.unwrap();
    assert_eq!(memberships.len(), 2);
    for membership in &memberships {
        assert_eq!(membership.is_active, membership.class_id == class.id);
    }
}

#[tokio::test]
async fn test_roster_roll_conflict_rolls_back_row() {
    let storage = setup_storage().await;
    let class = storage.create_class("12A").await.unwrap();
    let holder = storage
        .create_student(NewStudent {
            name: "Holder".to_string(),
            father_name: None,
            roll_number: Some("S-1".to_string()),
        })
        .await
        .unwrap();
    storage
        .enroll_student(holder.id, class.id, "R6")
        .await
        .unwrap();

    let mapping = mapping(ROSTER_MAPPING);
    let rows = rows(
        &[
            &["Roll", "Student Name", "Father"],
            &["R6", "Other", ""],
            &["R7", "Fine", ""],
        ],
        &mapping,
    );

    let summary = storage
        .process_student_roster(&rows, Some(class.id))
        .await
        .unwrap();
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 2);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.assigned, 1);

    // 冲突行新建的学生随保存点回滚
    assert!(storage.get_student_by_roll_number("R6").await.unwrap().is_none());
    assert!(storage.get_student_by_roll_number("R7").await.unwrap().is_some());
}

#[tokio::test]
async fn test_roster_missing_class_fails() {
    let storage = setup_storage().await;
    let mapping = mapping(ROSTER_MAPPING);
    let rows = rows(
        &[&["Roll", "Student Name", "Father"], &["R8", "Lost", ""]],
        &mapping,
    );

    assert!(storage.process_student_roster(&rows, Some(404)).await.is_err());
    assert!(storage.get_student_by_roll_number("R8").await.unwrap().is_none());
}
