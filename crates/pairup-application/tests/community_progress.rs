//! Accounts, community directory and progress.

use pairup_application::PairUpApp;
use pairup_core::progress::ProgressLevel;
use pairup_core::user::{Notification, NotificationKind, Role};
use pairup_infrastructure::Repositories;

fn app() -> PairUpApp {
    PairUpApp::new(Repositories::in_memory())
}

#[tokio::test]
async fn test_register_validates_required_fields() {
    let app = app();
    assert!(
        app.accounts
            .register("  ", "a@example.com", Role::Driver)
            .await
            .unwrap_err()
            .is_validation_failure()
    );
    assert!(app.accounts.register("Ana", "", Role::Driver).await.is_err());

    let ana = app
        .accounts
        .register(" Ana ", "ana@example.com", Role::Driver)
        .await
        .unwrap();
    assert_eq!(ana.name, "Ana");
    assert_eq!(app.accounts.profile(&ana.uid).await.unwrap(), ana);
}

#[tokio::test]
async fn test_members_sorted_online_first() {
    let app = app();
    let zoe = app
        .accounts
        .register("Zoe", "z@example.com", Role::Driver)
        .await
        .unwrap();
    app.accounts
        .register("beto", "b@example.com", Role::Navigator)
        .await
        .unwrap();
    app.accounts
        .register("Ana", "a@example.com", Role::Profesor)
        .await
        .unwrap();
    app.accounts.set_online(&zoe.uid, true).await.unwrap();

    let names: Vec<String> = app
        .community
        .members()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["Zoe", "Ana", "beto"]);
}

#[tokio::test]
async fn test_partner_search() {
    let app = app();
    let me = app
        .accounts
        .register("Me", "me@example.com", Role::Driver)
        .await
        .unwrap();
    let ana = app
        .accounts
        .register("Ana", "a@example.com", Role::Navigator)
        .await
        .unwrap();
    let luis = app
        .accounts
        .register("Luis", "l@example.com", Role::Navigator)
        .await
        .unwrap();

    app.accounts
        .update_languages(&me.uid, &["Kotlin".to_string()])
        .await
        .unwrap();
    app.accounts
        .update_languages(&ana.uid, &["Kotlin".to_string(), " kotlin ".to_string(), "Rust".to_string()])
        .await
        .unwrap();
    app.accounts
        .update_languages(&luis.uid, &["JavaScript".to_string()])
        .await
        .unwrap();
    app.accounts.set_availability(&luis.uid, true).await.unwrap();

    let found = app
        .community
        .search_partners(&me.uid, "KOT", false)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uid, ana.uid);
    assert_eq!(found[0].languages, vec!["Kotlin", "Rust"]);

    let by_name = app
        .community
        .search_partners(&me.uid, "lui", false)
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].uid, luis.uid);

    let everyone = app.community.search_partners(&me.uid, "", false).await.unwrap();
    assert_eq!(everyone.len(), 2);

    let available = app.community.search_partners(&me.uid, "", true).await.unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].uid, luis.uid);
}

#[tokio::test]
async fn test_testimonials_and_notifications() {
    let app = app();
    let ana = app
        .accounts
        .register("Ana", "a@example.com", Role::Navigator)
        .await
        .unwrap();

    let posted = app
        .community
        .post_testimonial(&ana.uid, "Great sessions", 4)
        .await
        .unwrap();
    assert_eq!(posted.author, "Ana");
    assert!(app.community.post_testimonial(&ana.uid, "", 4).await.is_err());
    assert!(app.community.post_testimonial(&ana.uid, "ok", 9).await.is_err());
    assert_eq!(app.community.list_testimonials().await.unwrap(), vec![posted]);

    let note = Notification::new("Welcome", "Glad you joined", NotificationKind::General);
    app.community.notify(&ana.uid, &note).await.unwrap();
    assert_eq!(app.community.notifications(&ana.uid).await.unwrap(), vec![note]);
}

#[tokio::test]
async fn test_progress_counts_finished_sessions() {
    let app = app();
    let dana = app
        .accounts
        .register("Dana", "d@example.com", Role::Driver)
        .await
        .unwrap();
    let nico = app
        .accounts
        .register("Nico", "n@example.com", Role::Navigator)
        .await
        .unwrap();
    let pilar = app
        .accounts
        .register("Pilar", "p@example.com", Role::Profesor)
        .await
        .unwrap();

    let finished = app.sessions.create_session(&dana.uid).await.unwrap();
    app.sessions
        .join_session(&finished.id, &nico.uid)
        .await
        .unwrap();
    app.sessions
        .finalize_session(&finished.id, &pilar.uid)
        .await
        .unwrap();
    // Still running; does not count.
    app.sessions.create_session(&dana.uid).await.unwrap();

    let summary = app.progress.summary(&dana.uid).await.unwrap();
    assert_eq!(summary.sessions, 1);
    assert_eq!(summary.level, ProgressLevel::Beginner);
    assert_eq!(summary.recent[0].title, "Driver: Dana - Navigator: Nico");

    let history = app.progress.history(&nico.uid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].session_id, finished.id);

    assert!(app.progress.summary("ghost").await.unwrap_err().is_not_found());
}
