mod common;

use common::*;
use rust_exam_ledger::errors::ExamLedgerError;
use rust_exam_ledger::models::exams::requests::NewExam;
use rust_exam_ledger::models::results::entities::ResultStatus;
use rust_exam_ledger::models::students::entities::NewStudent;
use rust_exam_ledger::storage::Storage;

fn new_exam(name: &str) -> NewExam {
    NewExam {
        name: name.to_string(),
        exam_date: "2025-06-15".to_string(),
    }
}

#[tokio::test]
async fn test_open_mode_identity_cascade() {
    let storage = setup_storage().await;
    let subjects = seed_subjects(&storage, &["Physics", "Chemistry", "Mathematics"]).await;
    let class_a = storage.create_class("10A").await.unwrap();
    let class_b = storage.create_class("9B").await.unwrap();

    // 全局学号精确匹配
    let asha = seed_member(&storage, class_a.id, "Asha", "1001").await;
    // 只有班级学号，没有全局学号
    let bilal = storage
        .create_student(NewStudent {
            name: "Bilal".to_string(),
            father_name: None,
            roll_number: None,
        })
        .await
        .unwrap();
    storage
        .enroll_student(bilal.id, class_b.id, "2002")
        .await
        .unwrap();
    // 全局学号包含匹配
    let chen = storage
        .create_student(NewStudent {
            name: "Chen".to_string(),
            father_name: None,
            roll_number: Some("X-3003".to_string()),
        })
        .await
        .unwrap();
    // 姓名兜底
    let zoya = storage
        .create_student(NewStudent {
            name: "Zoya Khan".to_string(),
            father_name: None,
            roll_number: None,
        })
        .await
        .unwrap();

    let mapping = mapping(&[
        ("Roll", "roll_number"),
        ("Name", "name"),
        ("Physics", "physics"),
        ("Maths", "mathematics"),
    ]);
    let rows = rows(
        &[
            &["Roll", "Name", "Physics", "Maths"],
            &["1001", "", "60", "70"],
            &["2002", "", "50", ""],
            &["3003", "", "", "90"],
            &["4004", "Zoya", "45", "55"],
            &["5005", "Nobody", "10", "10"],
        ],
        &mapping,
    );

    let summary = storage
        .process_quick_upload(new_exam("Pop Quiz"), &rows, &mapping, "General")
        .await
        .unwrap();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.absent_marked, 0);
    assert_eq!(summary.unmapped.len(), 1);
    assert_eq!(summary.unmapped[0].roll_number.as_deref(), Some("5005"));
    assert!(summary.errors.is_empty());
    let exam_id = summary.exam_id.expect("quick upload reports exam id");

    // 只挂载匹配到的科目
    let exam_subjects = storage.list_exam_subjects(exam_id).await.unwrap();
    let names: Vec<&str> = exam_subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Physics"));
    assert!(names.contains(&"Mathematics"));

    let results = storage.list_exam_results(exam_id).await.unwrap();
    assert_eq!(results.len(), 4);
    let asha_result = result_for(&results, "1001");
    assert_eq!(asha_result.student_id, asha.id);
    assert_eq!(asha_result.total, 130.0);
    assert_eq!(asha_result.average, 65.0);
    assert_eq!(result_for(&results, "2002").student_id, bilal.id);
    assert_eq!(result_for(&results, "3003").student_id, chen.id);
    assert_eq!(result_for(&results, "4004").student_id, zoya.id);
    assert_eq!(
        result_for(&results, "3003").mark_for(subject_id(&subjects, "Mathematics")),
        Some(90.0)
    );

    // 找到但没有全局学号的学生被回填
    let backfilled = storage
        .get_student_by_roll_number("2002")
        .await
        .unwrap()
        .expect("bilal backfilled");
    assert_eq!(backfilled.id, bilal.id);
    assert!(storage.get_student_by_roll_number("4004").await.unwrap().is_some());
    // 已有全局学号的不覆盖
    assert!(storage.get_student_by_roll_number("3003").await.unwrap().is_none());

    // 每个学生只剩默认班级中的一条激活学籍
    let general = storage
        .get_class_by_name("General")
        .await
        .unwrap()
        .expect("default class created");
    let memberships = storage.list_student_memberships(asha.id).await.unwrap();
    let active: Vec<_> = memberships.iter().filter(|m| m.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].class_id, general.id);
    assert_eq!(active[0].roll_number, "1001");
    assert!(
        memberships
            .iter()
            .any(|m| m.class_id == class_a.id && !m.is_active)
    );
}

#[tokio::test]
async fn test_reuses_existing_default_class_membership() {
    let storage = setup_storage().await;
    seed_subjects(&storage, &["Physics"]).await;
    let general = storage.create_class("General").await.unwrap();
    let student = seed_member(&storage, general.id, "Noor", "610").await;

    let mapping = mapping(&[("Roll", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll", "Physics"], &["610", "72"]], &mapping);

    for name in ["Weekly 1", "Weekly 2"] {
        let summary = storage
            .process_quick_upload(new_exam(name), &rows, &mapping, "General")
            .await
            .unwrap();
        assert_eq!(summary.processed, 1);
    }

    let memberships = storage.list_student_memberships(student.id).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert!(memberships[0].is_active);
}

#[tokio::test]
async fn test_roll_conflict_in_default_class_is_row_error() {
    let storage = setup_storage().await;
    seed_subjects(&storage, &["Physics"]).await;
    let general = storage.create_class("General").await.unwrap();
    // 默认班级中 777 已被 Quinn 占用
    let quinn = storage
        .create_student(NewStudent {
            name: "Quinn".to_string(),
            father_name: None,
            roll_number: Some("900".to_string()),
        })
        .await
        .unwrap();
    storage
        .enroll_student(quinn.id, general.id, "777")
        .await
        .unwrap();
    let parker = storage
        .create_student(NewStudent {
            name: "Parker".to_string(),
            father_name: None,
            roll_number: Some("777".to_string()),
        })
        .await
        .unwrap();

    let mapping = mapping(&[("Roll", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll", "Physics"], &["777", "30"], &["900", "40"]], &mapping);

    let summary = storage
        .process_quick_upload(new_exam("Conflict"), &rows, &mapping, "General")
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 2);
    assert!(summary.message(false).contains("1 errors occurred"));

    // 出错行的写入随保存点回滚
    assert!(
        storage
            .list_student_memberships(parker.id)
            .await
            .unwrap()
            .is_empty()
    );
    let results = storage
        .list_exam_results(summary.exam_id.unwrap())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].student_id, quinn.id);
    assert_eq!(results[0].status, ResultStatus::Present);
}

#[tokio::test]
async fn test_unresolved_subjects_create_nothing() {
    let storage = setup_storage().await;
    seed_subjects(&storage, &["Physics"]).await;

    let mapping = mapping(&[("Roll", "roll_number"), ("Art", "art")]);
    let rows = rows(&[&["Roll", "Art"], &["1", "5"]], &mapping);

    let err = storage
        .process_quick_upload(new_exam("Art Fair"), &rows, &mapping, "General")
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::SubjectMapping(_)));
    assert!(storage.get_class_by_name("General").await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_exam_date_rejected() {
    let storage = setup_storage().await;
    seed_subjects(&storage, &["Physics"]).await;

    let mapping = mapping(&[("Roll", "roll_number"), ("Physics", "physics")]);
    let err = storage
        .process_quick_upload(
            NewExam {
                name: "Bad Date".to_string(),
                exam_date: "15/06/2025".to_string(),
            },
            &[],
            &mapping,
            "General",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLedgerError::DateParse(_)));
}

#[tokio::test]
async fn test_stored_roll_with_inner_space_matches_raw_roll() {
    use rust_exam_ledger::entity::students::{
        ActiveModel as StudentActiveModel, Entity as Students,
    };
    use rust_exam_ledger::reconcile::StudentLookup;
    use rust_exam_ledger::reconcile::identity::IdentityQuery;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    let storage = setup_storage().await;
    let subjects = seed_subjects(&storage, &["Physics"]).await;

    // 旧数据：学号中间带空格，只能直接写库
    let now = chrono::Utc::now().timestamp();
    let legacy = StudentActiveModel {
        name: Set("Kofi".to_string()),
        father_name: Set(None),
        roll_number: Set(Some("10 2".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(storage.connection())
    .await
    .unwrap();

    let query = IdentityQuery {
        roll_number: "102",
        raw_roll_number: Some("10 2"),
        name: None,
    };
    assert!(
        StudentLookup::GlobalRoll
            .find(storage.connection(), &query)
            .await
            .unwrap()
            .is_none()
    );
    let found = StudentLookup::RawRoll
        .find(storage.connection(), &query)
        .await
        .unwrap()
        .expect("raw roll lookup");
    assert_eq!(found.id, legacy.id);

    let mapping = mapping(&[("Roll", "roll_number"), ("Physics", "physics")]);
    let rows = rows(&[&["Roll", "Physics"], &[" 10 2 ", "66"]], &mapping);
    assert_eq!(rows[0].raw_roll_number.as_deref(), Some("10 2"));

    let summary = storage
        .process_quick_upload(new_exam("Retest"), &rows, &mapping, "General")
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert!(summary.unmapped.is_empty());
    assert!(summary.errors.is_empty());

    let exam_id = summary.exam_id.expect("quick upload reports exam id");
    let results = storage.list_exam_results(exam_id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].student_id, legacy.id);
    assert_eq!(
        results[0].mark_for(subject_id(&subjects, "Physics")),
        Some(66.0)
    );

    // 不新建学生，也不改写已有学号
    assert_eq!(Students::find().count(storage.connection()).await.unwrap(), 1);
    assert!(storage.get_student_by_roll_number("102").await.unwrap().is_none());
    let stored = Students::find_by_id(legacy.id)
        .one(storage.connection())
        .await
        .unwrap()
        .expect("legacy student");
    assert_eq!(stored.roll_number.as_deref(), Some("10 2"));
}
