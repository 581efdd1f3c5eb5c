use proptest::prelude::*;

use case_form::attachments::BYTES_PER_MB;
use case_form::{AttachmentList, CandidateFile, MediaKind, RejectionReason, UploadPolicy, screen};

fn file(name: &str, size: u64) -> CandidateFile {
    CandidateFile::new(name, size)
}

#[test]
fn admission_is_additive_and_order_preserving() {
    let policy = UploadPolicy::default();
    let mut list = AttachmentList::new();
    assert!(
        list.accept(vec![file("a.stl", 10), file("b.pdf", 20)], &policy)
            .is_none()
    );
    assert!(list.accept(vec![file("c.png", 30)], &policy).is_none());
    assert_eq!(list.names(), vec!["a.stl", "b.pdf", "c.png"]);

    let removed = list.remove(1).unwrap();
    assert_eq!(removed.name, "b.pdf");
    assert_eq!(list.names(), vec!["a.stl", "c.png"]);
}

#[test]
fn duplicate_names_are_distinct_entries() {
    let policy = UploadPolicy::default();
    let mut list = AttachmentList::new();
    list.accept(vec![file("scan.stl", 1), file("scan.stl", 2)], &policy);
    assert_eq!(list.len(), 2);
    list.remove(0);
    assert_eq!(list.get(0).unwrap().size_bytes, 2);
}

#[test]
fn oversized_file_never_removes_existing_entries() {
    let policy = UploadPolicy::default();
    let mut list = AttachmentList::new();
    list.accept(vec![file("upper.stl", 1024)], &policy);
    let reason = list.accept(vec![file("huge.stl", 51 * BYTES_PER_MB)], &policy);
    assert_eq!(
        reason.unwrap().to_string(),
        "Some files exceed the maximum size of 50MB"
    );
    assert_eq!(list.names(), vec!["upper.stl"]);
}

#[test]
fn file_exactly_at_limit_is_admitted() {
    let screening = screen(
        vec![file("edge.stl", 50 * BYTES_PER_MB)],
        &UploadPolicy::default(),
    );
    assert_eq!(screening.admitted.len(), 1);
    assert!(screening.rejection.is_none());
}

#[test]
fn unsupported_kind_lists_accepted_formats() {
    let screening = screen(vec![file("setup.exe", 100)], &UploadPolicy::default());
    assert!(screening.admitted.is_empty());
    let reason = screening.rejection.unwrap();
    assert_eq!(
        reason,
        RejectionReason::UnsupportedKind {
            accepted: ".stl,.pdf,.jpg,.jpeg,.png".into()
        }
    );
    assert!(reason.to_string().contains(".stl,.pdf,.jpg,.jpeg,.png"));
}

#[test]
fn size_reason_overrides_kind_reason() {
    let screening = screen(
        vec![
            file("notes.docx", 10),
            file("big.pdf", 60 * BYTES_PER_MB),
            file("ok.jpg", 10),
        ],
        &UploadPolicy::default(),
    );
    assert_eq!(screening.admitted.len(), 1);
    assert_eq!(screening.admitted[0].media_kind, MediaKind::Jpeg);
    assert!(matches!(
        screening.rejection,
        Some(RejectionReason::TooLarge { .. })
    ));
}

#[test]
fn single_file_policy_keeps_the_first() {
    let policy = UploadPolicy::default().single_file();
    let screening = screen(vec![file("first.stl", 1), file("second.stl", 1)], &policy);
    assert_eq!(screening.admitted.len(), 1);
    assert_eq!(screening.admitted[0].name, "first.stl");
    let reason = screening.rejection.unwrap();
    assert_eq!(reason, RejectionReason::SingleFileOnly);
    assert!(reason.to_string().contains("Only one file"));
}

#[test]
fn mime_patterns_admit_by_declared_type() {
    let policy = UploadPolicy::new("image/*", BYTES_PER_MB, true);
    let screening = screen(
        vec![
            file("camera-roll", 10).with_mime("image/heic"),
            file("scan.stl", 10),
        ],
        &policy,
    );
    assert_eq!(screening.admitted.len(), 1);
    assert_eq!(screening.admitted[0].name, "camera-roll");
    assert_eq!(screening.admitted[0].media_kind, MediaKind::Other);
}

#[test]
fn content_is_shared_not_copied() {
    let candidate = CandidateFile::from_bytes("bite.stl", b"solid bite".to_vec());
    let mut list = AttachmentList::new();
    list.accept(vec![candidate], &UploadPolicy::default());
    let first = list.get(0).unwrap().clone();
    assert_eq!(first.size_bytes, 10);
    assert_eq!(
        first.content.as_ptr(),
        list.get(0).unwrap().content.as_ptr()
    );
}

proptest! {
    #[test]
    fn batches_append_in_order(batches in proptest::collection::vec(1usize..4, 1..6)) {
        let policy = UploadPolicy::default();
        let mut list = AttachmentList::new();
        let mut expected = Vec::new();
        for (batch_idx, size) in batches.iter().enumerate() {
            let names: Vec<String> = (0..*size).map(|i| format!("b{batch_idx}-{i}.stl")).collect();
            expected.extend(names.clone());
            list.accept(names.iter().map(|name| file(name, 1)).collect(), &policy);
        }
        let actual: Vec<String> = list.names().into_iter().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn remove_shifts_or_ignores(len in 0usize..6, index in 0usize..8) {
        let policy = UploadPolicy::default();
        let mut list = AttachmentList::new();
        list.accept((0..len).map(|i| file(&format!("{i}.pdf"), 1)).collect(), &policy);
        let before: Vec<String> = list.names().into_iter().map(str::to_string).collect();
        let removed = list.remove(index);
        let after: Vec<String> = list.names().into_iter().map(str::to_string).collect();
        if index < len {
            prop_assert_eq!(removed.map(|item| item.name), Some(before[index].clone()));
            let mut expected = before.clone();
            expected.remove(index);
            prop_assert_eq!(after, expected);
        } else {
            prop_assert!(removed.is_none());
            prop_assert_eq!(after, before);
        }
    }
}
