//! Player flows against a live in-process API

mod harness;

use client::{ClientError, Session, SubmissionForm, upload::Photo};
use common::{Rarity, models::NewMatto};
use harness::{TestServer, jpeg};

#[tokio::test]
async fn every_tier_credits_its_fixed_points() {
    let server = TestServer::spawn().await;
    let api = server.api();
    let mut session = Session::new(api.clone());
    let ana = session.register("ana", Some("pescatrice")).await.unwrap().clone();

    let mut credited = Vec::new();
    for rarity in Rarity::ALL {
        let matto = api
            .create_matto(&NewMatto {
                user_id: ana.id,
                username: ana.username.clone(),
                photo_data: Photo::from_bytes("x.jpg", jpeg()).unwrap().data_uri(),
                nickname: "Tizio".to_string(),
                description: String::new(),
                rarity,
            })
            .await
            .unwrap();
        assert_eq!(matto.points, rarity.points());
        credited.push(matto.points);
    }

    assert_eq!(credited, vec![10, 25, 50, 100]);
    assert!(credited.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(session.refresh().await.unwrap().total_points, 185);
}

#[tokio::test]
async fn invalid_submissions_send_nothing_and_keep_the_form() {
    let server = TestServer::spawn().await;
    let anonymous = Session::new(server.api());
    let mut session = Session::new(server.api());
    session.register("ana", Some("pescatrice")).await.unwrap();
    let photo = Photo::from_bytes("capitano.jpg", jpeg()).unwrap();

    let mut no_photo = SubmissionForm::new();
    no_photo.set_nickname("Il Capitano");
    no_photo.select_rarity(Rarity::Epic);

    let mut no_nickname = SubmissionForm::new();
    no_nickname.select_photo(photo.clone());
    no_nickname.set_nickname("   ");
    no_nickname.set_description("al porto");

    let mut no_session = SubmissionForm::new();
    no_session.select_photo(photo);
    no_session.set_nickname("Il Capitano");

    let before = server.request_count();
    for (form, who) in [
        (&mut no_photo, &session),
        (&mut no_nickname, &session),
        (&mut no_session, &anonymous),
    ] {
        let untouched = form.clone();
        let result = form.submit(who).await;
        assert!(matches!(
            result,
            Err(ClientError::Validation(_)) | Err(ClientError::Anonymous)
        ));
        assert_eq!(*form, untouched);
    }
    assert_eq!(server.requests_since(before), Vec::<String>::new());
}

#[tokio::test]
async fn successful_submission_resets_the_form() {
    let server = TestServer::spawn().await;
    let mut session = Session::new(server.api());
    session.register("ana", Some("pescatrice")).await.unwrap();

    let mut form = SubmissionForm::new();
    form.select_photo(Photo::from_bytes("capitano.png", jpeg()).unwrap());
    form.set_nickname("  Il Capitano ");
    form.set_description("sempre al porto");
    form.select_rarity(Rarity::Rare);

    let matto = form.submit(&session).await.unwrap();
    assert_eq!(matto.nickname, "Il Capitano");
    assert_eq!(matto.points, 25);

    assert!(form.is_default());
    assert_eq!(form.photo(), None);
    assert_eq!(form.preview(), None);
    assert_eq!(form.nickname(), "");
    assert_eq!(form.description(), "");
    assert_eq!(form.rarity(), Rarity::Common);
}

#[tokio::test]
async fn ana_uploads_an_epic_matto() {
    let server = TestServer::spawn().await;
    let mut app = server.app();
    app.on_start().await;

    assert!(app.on_register("ana", Some("pescatrice")).await);
    let before = app.current_user().unwrap().total_points;

    assert!(app.on_select_photo_bytes("capitano.jpg", jpeg()));
    app.on_nickname("Il Capitano");
    app.on_rarity(Rarity::Epic);
    let matto = app.on_submit().await.unwrap();
    assert_eq!(matto.points, 50);

    assert_eq!(app.current_user().unwrap().total_points, before + 50);
    assert!(app.form().is_default());

    let newest = &app.gallery().cards()[0];
    assert_eq!(newest.username, "ana");
    assert_eq!(newest.badge, "EPIC");
    assert_eq!(newest.points_label, "+50pt");

    let top = &app.leaderboard().rows(app.current_user().map(|u| u.id))[0];
    assert_eq!(top.username, "ana");
    assert_eq!(top.points, 50);
    assert!(top.is_current);

    // the user is re-read by id, never logged in again
    let requests = server.requests();
    assert!(!requests.iter().any(|r| r == "POST /api/login"));
    assert!(requests.iter().any(|r| r.starts_with("GET /api/users/")));
    assert!(app.prompter().alerts().is_empty());
}

#[tokio::test]
async fn leaderboard_shows_at_most_ten_rows() {
    let server = TestServer::spawn().await;
    let api = server.api();
    for i in 0..12 {
        Session::new(api.clone())
            .register(&format!("player{}", i), None)
            .await
            .unwrap();
    }

    let app = server.app();
    app.on_start().await;

    let fetched = app.leaderboard().view().snapshot().data.unwrap();
    assert_eq!(fetched.len(), 12);
    assert_eq!(app.leaderboard().rows(None).len(), 10);
}

#[tokio::test]
async fn login_refresh_and_logout() {
    let server = TestServer::spawn().await;
    Session::new(server.api())
        .register("ana", Some("pescatrice"))
        .await
        .unwrap();

    let mut session = Session::new(server.api());
    assert!(!session.is_authenticated());

    let err = session.login("ana", "sbagliata").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Wrong password"));
    assert!(!session.is_authenticated());

    let ana = session.login("ana", "pescatrice").await.unwrap().clone();
    assert_eq!(session.refresh().await.unwrap().id, ana.id);

    session.logout();
    assert!(session.current().is_none());
}

#[tokio::test]
async fn my_matti_lists_only_my_uploads() {
    let server = TestServer::spawn().await;
    let mut app = server.app();

    assert_eq!(app.on_my_matti().await, None);
    assert_eq!(
        app.prompter().alerts(),
        vec![ClientError::Anonymous.to_string()]
    );

    let mut bob = Session::new(server.api());
    bob.register("bob", Some("pescatore")).await.unwrap();
    let mut form = SubmissionForm::new();
    form.select_photo(Photo::from_bytes("b.jpg", jpeg()).unwrap());
    form.set_nickname("La Sirena");
    form.submit(&bob).await.unwrap();

    assert!(app.on_register("ana", Some("pescatrice")).await);
    assert_eq!(app.on_my_matti().await, Some(Vec::new()));

    assert!(app.on_select_photo_bytes("capitano.jpg", jpeg()));
    app.on_nickname("Il Capitano");
    app.on_rarity(Rarity::Rare);
    app.on_submit().await.unwrap();

    let mine = app.on_my_matti().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].nickname, "Il Capitano");
    assert_eq!(mine[0].points, 25);
}

#[tokio::test]
async fn server_errors_reach_the_prompter() {
    let server = TestServer::spawn().await;
    let mut app = server.app();

    assert!(app.on_register("ana", Some("pescatrice")).await);
    app.on_logout();
    assert!(!app.on_register("ana", Some("pescatrice")).await);

    assert_eq!(
        app.prompter().alerts(),
        vec!["Request failed (409): Username already exists".to_string()]
    );
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn repeated_loads_share_one_request() {
    let server = TestServer::spawn().await;
    let app = server.app();
    let api = server.api();

    let before = server.request_count();
    for _ in 0..5 {
        app.gallery().load(&api).await;
    }
    app.gallery().view().settled().await;

    let gallery_calls = server
        .requests_since(before)
        .into_iter()
        .filter(|r| r == "GET /api/matti")
        .count();
    assert_eq!(gallery_calls, 1);
}
