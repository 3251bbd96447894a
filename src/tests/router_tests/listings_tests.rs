// src/tests/router_tests/listings_tests.rs

use crate::db::listings::put_listings;
use crate::db::listings::tests::listing;
use crate::responses::error_to_response;
use crate::router::{handle, respond};
use crate::tests::utils::{body_json, get, init_test_db};

#[test]
fn lists_everything_without_filters() {
    let (_dir, db) = init_test_db();
    put_listings(
        &db,
        &[
            listing("1", "Nordrhein-Westfalen", "Muenster"),
            listing("2", "Bayern", "Muenchen"),
        ],
    )
    .unwrap();

    let resp = handle(get("/listings"), &db).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let body = body_json(resp);
    assert_eq!(body["count"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[test]
fn path_filters_and_limit() {
    let (_dir, db) = init_test_db();
    let listings: Vec<_> = (0..8)
        .map(|i| listing(&format!("m{i}"), "Nordrhein-Westfalen", "Muenster"))
        .chain((0..4).map(|i| listing(&format!("k{i}"), "Nordrhein-Westfalen", "Koeln")))
        .collect();
    put_listings(&db, &listings).unwrap();

    let resp = handle(get("/listings/Nordrhein-Westfalen/Muenster?limit=5"), &db).unwrap();
    let body = body_json(resp);

    assert_eq!(body["count"], 5);
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["address"]["state"], "Nordrhein-Westfalen");
        assert_eq!(item["address"]["city"], "Muenster");
    }
}

#[test]
fn bad_limit_falls_back_to_default() {
    let (_dir, db) = init_test_db();
    let listings: Vec<_> = (0..25)
        .map(|i| listing(&format!("{i:02}"), "Nordrhein-Westfalen", "Muenster"))
        .collect();
    put_listings(&db, &listings).unwrap();

    for uri in ["/listings?limit=abc", "/listings?limit=-5", "/listings"] {
        let body = body_json(handle(get(uri), &db).unwrap());
        assert_eq!(body["count"], 20, "{uri}");
    }
}

#[test]
fn encoded_path_segments_are_decoded() {
    let (_dir, db) = init_test_db();
    put_listings(&db, &[listing("1", "Baden-Württemberg", "Freiburg im Breisgau")]).unwrap();

    let resp = handle(
        get("/listings/Baden-W%C3%BCrttemberg/Freiburg%20im%20Breisgau"),
        &db,
    )
    .unwrap();
    assert_eq!(body_json(resp)["count"], 1);
}

#[test]
fn unknown_route_is_not_found() {
    let (_dir, db) = init_test_db();

    for uri in ["/", "/listings/a/b/c/d", "/expose/1"] {
        let err = handle(get(uri), &db).unwrap_err();
        let resp = error_to_response(err);
        assert_eq!(resp.status(), 404, "{uri}");
        assert_eq!(body_json(resp)["error"], "Not Found");
    }
}

#[test]
fn empty_state_segment_filters_on_city_only() {
    let (_dir, db) = init_test_db();
    put_listings(
        &db,
        &[
            listing("1", "Nordrhein-Westfalen", "Muenster"),
            listing("2", "Muenster", "Koeln"),
        ],
    )
    .unwrap();

    let body = body_json(handle(get("/listings//Muenster"), &db).unwrap());
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["id"], "1");
    assert_eq!(body["items"][0]["address"]["city"], "Muenster");
}

#[test]
fn respond_renders_errors_as_json() {
    let (_dir, db) = init_test_db();
    put_listings(&db, &[listing("1", "Bayern", "Muenchen")]).unwrap();

    let ok = respond(get("/listings/Bayern"), &db);
    assert_eq!(ok.status(), 200);
    assert_eq!(body_json(ok)["count"], 1);

    let missing = respond(get("/expose/1"), &db);
    assert_eq!(missing.status(), 404);
    assert_eq!(
        missing.headers().get("Content-Type").unwrap(),
        "application/json"
    );
    assert_eq!(body_json(missing)["error"], "Not Found");
}
