use std::time::Duration;

use serde_json::json;
use smash_client::{
    app::{
        form::{Disposition, Navigation, Outcome},
        page::Effect,
    },
    config::SuccessPolicy,
    domain::form::FormElement,
};
use wiremock::{
    matchers::{any, body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::helper::{login_form, spawn_app, spawn_app_with, CapturedLogs};

const CONNECTIVITY_ERROR: &str =
    "Error: Tidak dapat terhubung ke server. Periksa koneksi Anda dan coba lagi.";

#[tokio::test]
async fn successful_login_alerts_and_follows_the_server_redirect() {
    let app = spawn_app().await;
    app.set_cookie("csrftoken=tok123; Path=/");

    Mock::given(path("/account/login-ajax/"))
        .and(method("POST"))
        .and(header("X-CSRFToken", "tok123"))
        .and(body_string_contains("bulbasaur"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "username": "bulbasaur",
            "redirect_url": "/main/",
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let disposition = app.submit(login_form()).await;

    assert_eq!(
        disposition,
        Disposition::Intercepted(Outcome::Succeeded {
            message: "Success! Welcome bulbasaur".into(),
            navigation: Navigation::Redirect("/main/".into()),
        })
    );
    assert_eq!(
        app.document.effects(),
        vec![
            Effect::Alert("Success! Welcome bulbasaur".into()),
            Effect::Navigate("/main/".into()),
        ]
    );
}

#[tokio::test]
async fn follow_policy_falls_back_when_the_server_sends_no_redirect() {
    let app = spawn_app().await;

    Mock::given(path("/account/login-ajax/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.submit(login_form()).await;

    assert_eq!(
        app.document.effects(),
        vec![
            Effect::Alert("Success! Welcome".into()),
            Effect::Navigate("/".into()),
        ]
    );
}

#[tokio::test]
async fn marker_class_forms_redirect_to_the_fixed_route() {
    let app = spawn_app().await;

    Mock::given(path("/post/create/"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "redirect_url": "/ignored/",
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = FormElement::new()
        .with_class("ajax-form")
        .with_action("/post/create/")
        .text("title", "Design Hive");
    let disposition = app.submit(form).await;

    assert!(matches!(
        disposition,
        Disposition::Intercepted(Outcome::Succeeded {
            navigation: Navigation::Redirect(ref to),
            ..
        }) if to == "/"
    ));
}

#[tokio::test]
async fn reload_policy_reloads_the_page_in_place() {
    let app = spawn_app().await;

    // The comment form has no configured action, so it posts to its own.
    Mock::given(path("/comment/add/"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = FormElement::new()
        .with_id("comment-form")
        .with_action("/comment/add/")
        .text("content", "Nice!");
    app.submit(form).await;

    assert_eq!(
        app.document.effects(),
        vec![Effect::Alert("Success! Welcome".into()), Effect::Reload]
    );
}

#[tokio::test]
async fn field_errors_are_shown_and_the_page_stays() {
    let app = spawn_app().await;

    Mock::given(path("/account/register-ajax/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "errors": {
                "username": ["A user with that username already exists."],
                "password2": ["The two password fields didn't match.", "Too short."],
            },
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = FormElement::new()
        .with_id("register-form")
        .text("username", "bulbasaur")
        .text("password1", "a")
        .text("password2", "b");
    let disposition = app.submit(form).await;

    let message = "Error: A user with that username already exists.\n\
                   The two password fields didn't match.";
    assert_eq!(
        disposition,
        Disposition::Intercepted(Outcome::Rejected {
            message: message.into()
        })
    );
    assert_eq!(app.document.effects(), vec![Effect::Alert(message.into())]);
}

#[tokio::test]
async fn scalar_and_missing_errors_are_shown() {
    let app = spawn_app().await;
    let test_cases = [
        (json!({"success": false, "errors": "bad request"}), "Error: bad request"),
        (json!({"success": false}), "Error: An error occurred."),
    ];

    for (body, expected) in test_cases {
        let backend = &app.backend;
        backend.reset().await;
        Mock::given(path("/account/login-ajax/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(body))
            .mount(backend)
            .await;

        let disposition = app.submit(login_form()).await;

        assert_eq!(
            disposition,
            Disposition::Intercepted(Outcome::Rejected {
                message: expected.into()
            }),
            "unexpected outcome for {}",
            expected
        );
    }
}

#[tokio::test]
async fn a_body_that_is_not_json_shows_the_connectivity_message() {
    let app = spawn_app().await;

    Mock::given(path("/account/login-ajax/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>Server Error</h1>"))
        .expect(1)
        .mount(&app.backend)
        .await;

    let disposition = app.submit(login_form()).await;

    assert_eq!(
        disposition,
        Disposition::Intercepted(Outcome::Failed {
            message: CONNECTIVITY_ERROR.into()
        })
    );
    assert_eq!(
        app.document.effects(),
        vec![Effect::Alert(CONNECTIVITY_ERROR.into())]
    );
}

#[tokio::test]
async fn an_unreachable_backend_shows_the_connectivity_message() {
    let app = spawn_app().await;
    let dead = MockServer::builder().start().await;
    let dead_uri = dead.uri();
    drop(dead);

    let form = FormElement::new()
        .with_class("ajax-form")
        .with_action(format!("{}/account/login-ajax/", dead_uri))
        .text("username", "bulbasaur");
    let disposition = app.submit(form).await;

    assert_eq!(
        disposition,
        Disposition::Intercepted(Outcome::Failed {
            message: CONNECTIVITY_ERROR.into()
        })
    );
}

#[tokio::test]
async fn a_slow_backend_times_out_as_a_connectivity_failure() {
    let app = spawn_app_with(|config| config.backend.timeout_milliseconds = 100).await;

    Mock::given(path("/account/login-ajax/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&app.backend)
        .await;

    let disposition = app.submit(login_form()).await;

    assert!(matches!(
        disposition,
        Disposition::Intercepted(Outcome::Failed { .. })
    ));
}

#[tokio::test]
async fn forms_without_registration_are_not_intercepted() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let form = FormElement::new()
        .with_id("search")
        .with_class("navbar-form")
        .with_action("/search/")
        .text("q", "design");
    let disposition = app.submit(form).await;

    assert_eq!(disposition, Disposition::PassThrough);
    assert!(app.document.effects().is_empty());
}

#[tokio::test]
async fn a_missing_token_still_sends_the_header() {
    let app = spawn_app().await;

    Mock::given(path("/account/login-ajax/"))
        .and(header("X-CSRFToken", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let disposition = app.submit(login_form()).await;

    assert!(matches!(
        disposition,
        Disposition::Intercepted(Outcome::Succeeded { .. })
    ));
}

#[tokio::test]
async fn the_token_is_read_at_submission_time() {
    let app = spawn_app().await;

    Mock::given(path("/home/api/feed/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "csrftoken=fresh; Path=/")
                .set_body_json(json!({"posts": []})),
        )
        .mount(&app.backend)
        .await;
    Mock::given(path("/account/login-ajax/"))
        .and(header("X-CSRFToken", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    app.set_cookie("csrftoken=stale; Path=/");
    app.load().await;
    let disposition = app.submit(login_form()).await;

    assert!(matches!(
        disposition,
        Disposition::Intercepted(Outcome::Succeeded { .. })
    ));
}

#[tokio::test]
async fn a_second_submit_while_waiting_is_suppressed() {
    let app = spawn_app().await;

    Mock::given(path("/account/login-ajax/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let (first, second) = tokio::join!(app.submit(login_form()), app.submit(login_form()));

    assert!(matches!(
        first,
        Disposition::Intercepted(Outcome::Succeeded { .. })
    ));
    assert_eq!(second, Disposition::Intercepted(Outcome::Suppressed));
}

#[tokio::test]
async fn double_submission_guard_can_be_switched_off() {
    let app = spawn_app_with(|config| {
        config.interceptor.prevent_double_submit = false;
        config.interceptor.forms[0].on_success = SuccessPolicy::Reload;
    })
    .await;

    Mock::given(path("/account/login-ajax/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&app.backend)
        .await;

    let (first, second) = tokio::join!(app.submit(login_form()), app.submit(login_form()));

    for disposition in [first, second] {
        assert!(matches!(
            disposition,
            Disposition::Intercepted(Outcome::Succeeded {
                navigation: Navigation::Reload,
                ..
            })
        ));
    }
}

#[tokio::test]
async fn file_fields_are_sent_as_multipart_parts() {
    let app = spawn_app().await;

    Mock::given(path("/post/create/"))
        .and(body_string_contains(r#"filename="cover.txt""#))
        .and(body_string_contains("cover bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let form = FormElement::new()
        .with_class("ajax-form")
        .with_action("/post/create/")
        .text("title", "Behance Connection")
        .file("cover", "cover.txt", Some("text/plain"), b"cover bytes".to_vec());
    app.submit(form).await;
}

#[tokio::test]
async fn forms_without_an_id_sharing_an_action_are_all_submitted() {
    let app = spawn_app().await;

    for post_id in ["1", "2"] {
        Mock::given(path("/post/like/"))
            .and(method("POST"))
            .and(body_string_contains(format!("\r\n\r\n{}\r\n", post_id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&app.backend)
            .await;
    }

    let like = |post_id: &str| {
        FormElement::new()
            .with_class("ajax-form")
            .with_action("/post/like/")
            .text("post_id", post_id)
    };
    let (first, second) = tokio::join!(app.submit(like("1")), app.submit(like("2")));

    for disposition in [first, second] {
        assert!(matches!(
            disposition,
            Disposition::Intercepted(Outcome::Succeeded { .. })
        ));
    }
}

#[tokio::test]
async fn the_token_comes_from_the_page_not_the_action_host() {
    let app = spawn_app().await;
    app.set_cookie("csrftoken=page-token; Path=/account/");

    Mock::given(path("/api/like/"))
        .and(header("X-CSRFToken", "page-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    // Same mock server under another host name and path: the jar holds no
    // cookie for this URL.
    let action = app.backend.uri().replace("127.0.0.1", "localhost") + "/api/like/";
    let form = FormElement::new()
        .with_class("ajax-form")
        .with_action(action)
        .text("post_id", "1");
    let disposition = app.submit(form).await;

    assert!(matches!(
        disposition,
        Disposition::Intercepted(Outcome::Succeeded { .. })
    ));
}

#[tokio::test]
async fn the_submission_span_records_the_resolved_action() {
    let app = spawn_app().await;
    let (logs, _guard) = CapturedLogs::start();

    Mock::given(path("/account/login-ajax/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&app.backend)
        .await;

    app.submit(login_form()).await;

    let expected = format!("action={}/account/login-ajax/", app.backend.uri());
    assert!(logs.contents().contains(&expected), "{}", logs.contents());
}
