//! Service facade: draft flow, privileges, and surface upkeep

use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use roster_daemon::{RosterService, ServiceError, StaticPrivileges};
use roster_registry::GroupRegistry;
use roster_sweeper::{RenderSurface, SurfaceError};
use roster_types::{
    GroupEdit, GroupView, ManualClock, ParticipantId, Placement, RenderHandle, RoleCatalog,
    RoleName, RosterError, SequentialIdGenerator,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Open(String),
    Refresh(RenderHandle),
    Delete(RenderHandle),
}

/// Records calls; open, refresh, and delete can be made to fail.
#[derive(Default)]
struct FakeSurface {
    calls: Mutex<Vec<Call>>,
    fail_open: AtomicBool,
    fail_refresh: bool,
    fail_delete: bool,
    fixed_handle: Option<RenderHandle>,
}

impl FakeSurface {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RenderSurface for FakeSurface {
    async fn open(&self, name: &str) -> Result<RenderHandle, SurfaceError> {
        self.calls.lock().push(Call::Open(name.to_string()));
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(SurfaceError::Unavailable("gateway timeout".into()));
        }
        Ok(self
            .fixed_handle
            .clone()
            .unwrap_or_else(|| RenderHandle::new(format!("thread-{}", name))))
    }

    async fn refresh(&self, handle: &RenderHandle, _: &GroupView) -> Result<(), SurfaceError> {
        self.calls.lock().push(Call::Refresh(handle.clone()));
        if self.fail_refresh {
            return Err(SurfaceError::Unavailable("rate limited".into()));
        }
        Ok(())
    }

    async fn delete(&self, handle: &RenderHandle) -> Result<(), SurfaceError> {
        self.calls.lock().push(Call::Delete(handle.clone()));
        if self.fail_delete {
            return Err(SurfaceError::NotFound(handle.clone()));
        }
        Ok(())
    }
}

fn p(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

fn service_with(surface: Arc<FakeSurface>) -> (RosterService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let registry = Arc::new(GroupRegistry::with_sources(
        Box::new(SequentialIdGenerator::new()),
        clock.clone(),
    ));
    let privileges = StaticPrivileges::new([p("admin"), p("org")]);
    let service = RosterService::new(
        registry,
        surface,
        Arc::new(privileges),
        RoleCatalog::reference(),
        Duration::minutes(15),
    );
    (service, clock)
}

async fn create_group(service: &RosterService, name: &str) -> GroupView {
    service
        .begin_group(&p("org"), "Biolab", Some("bring potions".into()), name)
        .unwrap();
    service
        .choose_roles(&p("org"), vec!["Arch Bishop".into(), "Ranger".into()])
        .unwrap();
    service.finish_group(&p("org"), &[1, 2]).await.unwrap()
}

#[tokio::test]
async fn test_create_group_through_drafts() {
    let surface = Arc::new(FakeSurface::default());
    let (service, _) = service_with(surface.clone());

    let catalog = service
        .begin_group(&p("org"), "Biolab", None, "biolab")
        .unwrap();
    assert_eq!(catalog.len(), 19);
    service
        .choose_roles(&p("org"), vec!["Arch Bishop".into(), "Ranger".into()])
        .unwrap();
    let view = service.finish_group(&p("org"), &[1, 2]).await.unwrap();

    assert_eq!(view.title, "Biolab");
    assert_eq!(view.owner, p("org"));
    assert_eq!(view.render_target, RenderHandle::new("thread-biolab"));
    assert_eq!(view.roles.len(), 2);
    assert_eq!(view.roles[1].capacity, 2);
    assert!(service.drafts().is_empty());
    assert_eq!(
        surface.calls(),
        vec![
            Call::Open("biolab".into()),
            Call::Refresh(RenderHandle::new("thread-biolab"))
        ]
    );
}

#[tokio::test]
async fn test_unprivileged_cannot_begin() {
    let (service, _) = service_with(Arc::new(FakeSurface::default()));
    let err = service
        .begin_group(&p("member"), "Biolab", None, "biolab")
        .unwrap_err();
    assert!(matches!(err, ServiceError::CreateDenied(who) if who == p("member")));
}

#[tokio::test]
async fn test_failed_create_deletes_opened_surface() {
    let surface = Arc::new(FakeSurface {
        fixed_handle: Some(RenderHandle::new("shared")),
        ..Default::default()
    });
    let (service, _) = service_with(surface.clone());
    create_group(&service, "first").await;

    service.begin_group(&p("admin"), "Second", None, "second").unwrap();
    service
        .choose_roles(&p("admin"), vec!["Sura".into()])
        .unwrap();
    let err = service.finish_group(&p("admin"), &[1]).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Roster(RosterError::SurfaceInUse(_))
    ));
    assert_eq!(
        surface.calls().last(),
        Some(&Call::Delete(RenderHandle::new("shared")))
    );
    assert_eq!(service.registry().len(), 1);
    assert!(service.drafts().pending(&p("admin")).is_some());
}

#[tokio::test]
async fn test_draft_survives_surface_outage() {
    let surface = Arc::new(FakeSurface::default());
    surface.fail_open.store(true, Ordering::SeqCst);
    let (service, _) = service_with(surface.clone());

    service.begin_group(&p("org"), "Biolab", None, "biolab").unwrap();
    service
        .choose_roles(&p("org"), vec!["Sura".into()])
        .unwrap();
    let err = service.finish_group(&p("org"), &[2]).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Surface(SurfaceError::Unavailable(_))
    ));
    assert!(service.registry().is_empty());
    assert!(service.drafts().pending(&p("org")).is_some());

    surface.fail_open.store(false, Ordering::SeqCst);
    let view = service.finish_group(&p("org"), &[2]).await.unwrap();
    assert_eq!(view.title, "Biolab");
    assert_eq!(view.roles[0].capacity, 2);
    assert!(service.drafts().is_empty());
}

#[tokio::test]
async fn test_join_and_leave_at_surface() {
    let surface = Arc::new(FakeSurface::default());
    let (service, _) = service_with(surface.clone());
    let view = create_group(&service, "lab").await;
    let handle = view.render_target.clone();
    let ab = RoleName::from("Arch Bishop");

    let first = service.join_at_surface(&handle, &p("a"), &ab).await.unwrap();
    assert_eq!(first.placement, Placement::Admitted);
    let second = service.join_at_surface(&handle, &p("b"), &ab).await.unwrap();
    assert_eq!(second.placement, Placement::Waitlisted { position: 1 });

    let out = service.leave_at_surface(&handle, &p("a")).await.unwrap();
    assert_eq!(out.promotions.len(), 1);
    assert_eq!(out.promotions[0].participant, p("b"));

    let err = service
        .join_at_surface(&RenderHandle::new("elsewhere"), &p("c"), &ab)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnknownSurface(_)));

    let refreshes = surface
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Refresh(_)))
        .count();
    // Creation plus three successful mutations
    assert_eq!(refreshes, 4);
}

#[tokio::test]
async fn test_refresh_failure_keeps_outcome() {
    let surface = Arc::new(FakeSurface {
        fail_refresh: true,
        ..Default::default()
    });
    let (service, _) = service_with(surface);
    let view = create_group(&service, "lab").await;

    let out = service
        .join(&view.id, &p("a"), &"Ranger".into())
        .await
        .unwrap();
    assert!(out.is_admitted());
    assert_eq!(
        service.group(&view.id).unwrap().role_of(&p("a")),
        Some(&RoleName::from("Ranger"))
    );
}

#[tokio::test]
async fn test_remove_member_uses_privileges() {
    let (service, _) = service_with(Arc::new(FakeSurface::default()));
    let view = create_group(&service, "lab").await;
    let ranger = RoleName::from("Ranger");
    service.join(&view.id, &p("a"), &ranger).await.unwrap();
    service.join(&view.id, &p("b"), &ranger).await.unwrap();

    let err = service
        .remove_member(&view.id, &p("a"), &p("b"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Roster(RosterError::Forbidden(_))));

    // Elevated, not the owner
    let out = service
        .remove_member(&view.id, &p("a"), &p("admin"))
        .await
        .unwrap();
    assert_eq!(out.removed_by, Some(p("admin")));
}

#[tokio::test]
async fn test_edit_refreshes_only_on_change() {
    let surface = Arc::new(FakeSurface::default());
    let (service, _) = service_with(surface.clone());
    let view = create_group(&service, "lab").await;
    let before = surface.calls().len();

    let out = service
        .edit(&view.id, GroupEdit::new().notes(""), &p("org"))
        .await
        .unwrap();
    assert!(out.notes_changed);
    assert_eq!(out.view.notes, None);
    assert_eq!(surface.calls().len(), before + 1);

    let out = service
        .edit(&view.id, GroupEdit::new(), &p("org"))
        .await
        .unwrap();
    assert!(!out.title_changed && !out.notes_changed);
    assert_eq!(surface.calls().len(), before + 1);
}

#[tokio::test]
async fn test_close_deletes_surface_even_when_delete_fails() {
    let surface = Arc::new(FakeSurface {
        fail_delete: true,
        ..Default::default()
    });
    let (service, _) = service_with(surface.clone());
    let view = create_group(&service, "lab").await;

    let err = service.close(&view.id, &p("stranger")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Roster(RosterError::Forbidden(_))));

    let retired = service.close(&view.id, &p("org")).await.unwrap();
    assert_eq!(retired.id, view.id);
    assert!(service.group(&view.id).is_none());
    assert_eq!(
        surface.calls().last(),
        Some(&Call::Delete(view.render_target.clone()))
    );
}

#[tokio::test]
async fn test_role_choices_show_occupancy() {
    let (service, _) = service_with(Arc::new(FakeSurface::default()));
    let view = create_group(&service, "lab").await;
    service
        .join(&view.id, &p("a"), &"Ranger".into())
        .await
        .unwrap();

    let choices = service.role_choices(&view.id).unwrap();
    let ranger = choices.iter().find(|r| r.name.as_str() == "Ranger").unwrap();
    assert_eq!(ranger.occupants.len(), 1);
    assert_eq!(ranger.open_slots(), 1);

    let missing = service.role_choices(&roster_types::GroupId::new("nope"));
    assert!(matches!(
        missing.unwrap_err(),
        ServiceError::Roster(RosterError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_stale_drafts_are_purged() {
    let (service, clock) = service_with(Arc::new(FakeSurface::default()));
    service.begin_group(&p("org"), "Later", None, "later").unwrap();

    clock.advance(Duration::minutes(20));
    assert_eq!(service.purge_drafts(), 1);
    let err = service
        .choose_roles(&p("org"), vec!["Sura".into()])
        .unwrap_err();
    assert!(matches!(err, ServiceError::DraftNotFound(_)));
}
