use super::common::*;

use crate::workflows::hazards::domain::{CategorySuggestion, HazardCategory, ImageRef};
use crate::workflows::hazards::{IntakeGuard, IntakePolicy, IntakeViolation};

#[test]
fn accepts_and_trims_valid_drafts() {
    let mut draft = draft();
    draft.description = "   Lane markings have faded completely   ".to_string();

    let accepted = IntakeGuard::default().accept(draft).expect("accepted");
    assert_eq!(accepted.description, "Lane markings have faded completely");
}

#[test]
fn counts_characters_not_bytes() {
    let mut draft = draft();
    draft.description = "Ổ gà sâu!".to_string();

    match IntakeGuard::default().accept(draft) {
        Err(IntakeViolation::DescriptionTooShort { min, found }) => {
            assert_eq!(min, 10);
            assert_eq!(found, 9);
        }
        other => panic!("expected short description, got {other:?}"),
    }
}

#[test]
fn rejects_more_than_three_images() {
    let mut draft = draft();
    draft.images = (0..4)
        .map(|index| ImageRef(format!("uploads/{index}.jpg")))
        .collect();

    assert!(matches!(
        IntakeGuard::default().accept(draft),
        Err(IntakeViolation::TooManyImages { max: 3, found: 4 })
    ));
}

#[test]
fn rejects_out_of_range_coordinates() {
    assert!(matches!(
        IntakeGuard::default().accept(draft_at(91.0, 105.0)),
        Err(IntakeViolation::InvalidCoordinates { .. })
    ));
    assert!(matches!(
        IntakeGuard::default().accept(draft_at(21.0, f64::NAN)),
        Err(IntakeViolation::InvalidCoordinates { .. })
    ));
}

#[test]
fn clamps_suggestion_confidence() {
    let mut draft = draft();
    draft.suggestion = Some(CategorySuggestion {
        category: HazardCategory::BrokenRoad,
        confidence: 1.7,
    });

    let accepted = IntakeGuard::default().accept(draft).expect("accepted");
    let suggestion = accepted.suggestion.expect("suggestion kept");
    assert_eq!(suggestion.confidence, 1.0);
    assert_eq!(accepted.category, HazardCategory::Pothole);
}

#[test]
fn custom_policies_apply() {
    let guard = IntakeGuard::with_policy(IntakePolicy::new(3, 0));
    let mut draft = draft();
    draft.description = "gap".to_string();

    assert!(matches!(
        guard.accept(draft.clone()),
        Err(IntakeViolation::TooManyImages { max: 0, found: 1 })
    ));
    draft.images.clear();
    assert!(guard.accept(draft).is_ok());
}
