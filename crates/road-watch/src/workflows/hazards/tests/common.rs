use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::store::{MemoryStore, RepositoryError};
use crate::workflows::hazards::domain::{
    HazardCategory, HazardReport, ImageRef, Location, ReportDraft, ReportId,
};
use crate::workflows::hazards::repository::ReportRepository;
use crate::workflows::hazards::{hazard_router, HazardService, VotePolicy};
use crate::workflows::reputation::domain::{User, UserId};
use crate::workflows::reputation::repository::UserRepository;

pub(super) type MemoryService = HazardService<MemoryStore, MemoryStore>;

/// Hoan Kiem Lake, Hanoi.
pub(super) const HANOI: (f64, f64) = (21.0285, 105.8542);
/// Ben Thanh Market, Ho Chi Minh City.
pub(super) const SAIGON: (f64, f64) = (10.7725, 106.6980);

pub(super) fn draft_at(lat: f64, lng: f64) -> ReportDraft {
    ReportDraft {
        location: Location {
            lat,
            lng,
            address: Some("Dinh Tien Hoang, Hoan Kiem".to_string()),
            captured_at: None,
        },
        category: HazardCategory::Pothole,
        description: "Deep pothole in the right lane".to_string(),
        images: vec![ImageRef("uploads/pothole-1.jpg".to_string())],
        suggestion: None,
    }
}

pub(super) fn draft() -> ReportDraft {
    draft_at(HANOI.0, HANOI.1)
}

pub(super) fn build_service() -> (MemoryService, Arc<MemoryStore>) {
    build_service_with(VotePolicy::default())
}

pub(super) fn build_service_with(policy: VotePolicy) -> (MemoryService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = HazardService::new(store.clone(), store.clone(), policy);
    (service, store)
}

pub(super) fn register(service: &MemoryService, name: &str) -> User {
    service
        .register_user(Some(name.to_string()))
        .expect("member registered")
}

pub(super) fn voters(service: &MemoryService, count: usize) -> Vec<UserId> {
    (0..count)
        .map(|index| register(service, &format!("Voter{index}")).id)
        .collect()
}

pub(super) fn submitted(service: &MemoryService, reporter: &UserId) -> HazardReport {
    service
        .submit_report(reporter, draft())
        .expect("report accepted")
}

pub(super) fn hazard_router_with_service(service: MemoryService) -> axum::Router {
    hazard_router(Arc::new(service))
}

/// Report store that is permanently offline.
pub(super) struct UnavailableReports;

impl ReportRepository for UnavailableReports {
    fn insert(&self, _report: HazardReport) -> Result<HazardReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _report: HazardReport) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<HazardReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<HazardReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &ReportId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Member store that delegates to memory but refuses updates for one chosen member.
pub(super) struct FlakyMembers {
    inner: Arc<MemoryStore>,
    failing: Mutex<Option<UserId>>,
}

impl FlakyMembers {
    pub(super) fn fail_updates_for(&self, id: &UserId) {
        *self.failing.lock().expect("failing lock") = Some(id.clone());
    }
}

impl UserRepository for FlakyMembers {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        UserRepository::insert(self.inner.as_ref(), user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        if self.failing.lock().expect("failing lock").as_ref() == Some(&user.id) {
            return Err(RepositoryError::Unavailable("members offline".to_string()));
        }
        UserRepository::update(self.inner.as_ref(), user)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::fetch(self.inner.as_ref(), id)
    }

    fn all(&self) -> Result<Vec<User>, RepositoryError> {
        UserRepository::all(self.inner.as_ref())
    }

    fn current(&self) -> Result<Option<UserId>, RepositoryError> {
        self.inner.current()
    }

    fn set_current(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.inner.set_current(id)
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        UserRepository::clear(self.inner.as_ref())
    }
}

pub(super) type FlakyService = HazardService<FlakyMembers, MemoryStore>;

pub(super) fn build_flaky_service() -> (FlakyService, Arc<FlakyMembers>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let members = Arc::new(FlakyMembers {
        inner: store.clone(),
        failing: Mutex::new(None),
    });
    let service = HazardService::new(members.clone(), store.clone(), VotePolicy::default());
    (service, members, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
