use super::domain::ReportDraft;

/// Validation errors raised while accepting a new report.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("description must contain at least {min} characters (found {found})")]
    DescriptionTooShort { min: usize, found: usize },
    #[error("at most {max} images may be attached (found {found})")]
    TooManyImages { max: usize, found: usize },
    #[error("location coordinates out of range: ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 10;
const DEFAULT_MAX_IMAGES: usize = 3;

/// Limits applied to inbound report drafts.
#[derive(Debug, Clone)]
pub struct IntakePolicy {
    min_description_chars: usize,
    max_images: usize,
}

impl IntakePolicy {
    pub fn new(min_description_chars: usize, max_images: usize) -> Self {
        Self {
            min_description_chars,
            max_images,
        }
    }

    pub fn min_description_chars(&self) -> usize {
        self.min_description_chars
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DESCRIPTION_CHARS, DEFAULT_MAX_IMAGES)
    }
}

/// Guard responsible for producing normalized drafts the service can persist.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    policy: IntakePolicy,
}

impl IntakeGuard {
    pub fn with_policy(policy: IntakePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Trim the description, clamp the advisory confidence, and enforce the limits.
    pub fn accept(&self, mut draft: ReportDraft) -> Result<ReportDraft, IntakeViolation> {
        if !draft.location.point().is_valid() {
            return Err(IntakeViolation::InvalidCoordinates {
                lat: draft.location.lat,
                lng: draft.location.lng,
            });
        }

        let description = draft.description.trim().to_string();
        let found = description.chars().count();
        if found < self.policy.min_description_chars {
            return Err(IntakeViolation::DescriptionTooShort {
                min: self.policy.min_description_chars,
                found,
            });
        }
        draft.description = description;

        if draft.images.len() > self.policy.max_images {
            return Err(IntakeViolation::TooManyImages {
                max: self.policy.max_images,
                found: draft.images.len(),
            });
        }

        if let Some(suggestion) = draft.suggestion.as_mut() {
            suggestion.confidence = if suggestion.confidence.is_finite() {
                suggestion.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        Ok(draft)
    }
}
