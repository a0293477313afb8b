//! End-to-end requests against the `may_minihttp` server.

use petclinic::repository::MemoryStore;
use petclinic::web::{server, Clinic};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn free_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("ephemeral addr");
    addr.to_string()
}

fn start() -> String {
    let store = Arc::new(MemoryStore::seeded());
    let clinic = Clinic::new(store.clone(), store, 5);
    let addr = free_addr();
    // The handle is dropped; the server lives for the rest of the test binary.
    let _handle = server::serve(clinic, &addr).expect("start server");

    let base = format!("http://{addr}");
    for _ in 0..50 {
        if ureq::get(&base).call().is_ok() {
            return base;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("server at {base} never came up");
}

#[test]
fn test_serves_pages_forms_and_errors() {
    let base = start();

    let welcome = ureq::get(&base).call().expect("welcome");
    assert_eq!(welcome.status(), 200);
    assert!(welcome
        .header("Content-Type")
        .is_some_and(|v| v.starts_with("text/html")));

    let created = ureq::post(&format!("{base}/owners/new"))
        .send_form(&[
            ("firstName", "Jane"),
            ("lastName", "Doe"),
            ("address", "12 Elm St."),
            ("city", "Springfield"),
            ("telephone", "6085550000"),
        ])
        .expect("create owner");
    let body = created.into_string().expect("body");
    assert!(body.contains("New Owner created"));
    assert!(body.contains("<b>Jane Doe</b>"));

    let json = ureq::get(&format!("{base}/vets"))
        .call()
        .expect("vets json")
        .into_string()
        .expect("body");
    assert!(json.starts_with("{\"vetList\":["));

    let xml = ureq::get(&format!("{base}/vets"))
        .set("Accept", "application/xml")
        .call()
        .expect("vets xml")
        .into_string()
        .expect("body");
    assert!(xml.contains("<vets><vetList>"));

    match ureq::get(&format!("{base}/owners/999")).call() {
        Err(ureq::Error::Status(code, response)) => {
            assert_eq!(code, 404);
            let body = response.into_string().expect("body");
            assert!(body.contains("Owner Id not found: 999"));
        }
        other => panic!("expected 404, got {other:?}"),
    }

    match ureq::get(&format!("{base}/oups")).call() {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 500),
        other => panic!("expected 500, got {other:?}"),
    }
}

#[test]
fn test_head_and_malformed_bodies() {
    let base = start();

    let head = ureq::head(&format!("{base}/owners/find")).call().expect("head");
    assert_eq!(head.status(), 200);
    assert!(head
        .header("Content-Type")
        .is_some_and(|v| v.starts_with("text/html")));
    assert!(head.into_string().expect("body").is_empty());

    // Invalid UTF-8 still binds; the missing fields fail validation.
    let form = ureq::post(&format!("{base}/owners/new"))
        .set("Content-Type", "application/x-www-form-urlencoded")
        .send_bytes(b"firstName=J\xffne&lastName=Doe")
        .expect("form with invalid utf-8");
    assert_eq!(form.status(), 200);
    assert!(form.into_string().expect("body").contains("There was an error in creating the owner"));

    let after = ureq::get(&format!("{base}/vets.html")).call().expect("vets page");
    assert_eq!(after.status(), 200);
}
