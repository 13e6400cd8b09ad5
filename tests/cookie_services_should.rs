use axum::http::{HeaderMap, HeaderValue, header};
use hls_proxy::server::services::cookie_services::{
    CookieService, CookieServiceTrait, extract_set_cookies,
};

const ORIGIN: &str = "http://panel.example:8080";

#[test]
fn return_empty_string_for_unknown_origin() {
    let jar = CookieService::new();

    assert_eq!(jar.get_cookies(ORIGIN), "");
    assert_eq!(jar.origin_count(), 0);
}

#[test]
fn keep_only_the_leading_pair_of_each_set_cookie() {
    let jar = CookieService::new();
    jar.store_cookies(ORIGIN, &["a=1; Path=/".to_string(), "b=2".to_string()]);

    let cookies = jar.get_cookies(ORIGIN);
    let mut pairs: Vec<&str> = cookies.split("; ").collect();
    pairs.sort();

    assert_eq!(pairs, vec!["a=1", "b=2"]);
    assert!(!cookies.contains("Path"));
}

#[test]
fn overwrite_same_named_cookies_from_any_path() {
    let jar = CookieService::new();
    jar.store_cookies(ORIGIN, &["sid=old; Path=/live".to_string(), "lang=en".to_string()]);
    jar.store_cookies(ORIGIN, &["sid=new; Path=/movie".to_string()]);

    assert_eq!(jar.get_cookies(ORIGIN), "sid=new; lang=en");
}

#[test]
fn keep_origins_apart() {
    let jar = CookieService::new();
    jar.store_cookies(ORIGIN, &["a=1".to_string()]);
    jar.store_cookies("https://cdn.example", &["b=2".to_string()]);

    assert_eq!(jar.get_cookies(ORIGIN), "a=1");
    assert_eq!(jar.get_cookies("https://cdn.example"), "b=2");
    assert_eq!(jar.get_cookies("http://panel.example"), "");
    assert_eq!(jar.origin_count(), 2);
}

#[test]
fn ignore_empty_input_and_nameless_cookies() {
    let jar = CookieService::new();
    jar.store_cookies(ORIGIN, &[]);
    assert_eq!(jar.origin_count(), 0);

    jar.store_cookies(ORIGIN, &["=orphan; Path=/".to_string(), "token=a=b".to_string()]);
    assert_eq!(jar.get_cookies(ORIGIN), "token=a=b");
}

#[test]
fn extract_every_set_cookie_field_separately() {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        HeaderValue::from_static("a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT"),
    );
    headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2; HttpOnly"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    let set_cookies = extract_set_cookies(&headers);

    assert_eq!(
        set_cookies,
        vec![
            "a=1; Expires=Wed, 21 Oct 2026 07:28:00 GMT".to_string(),
            "b=2; HttpOnly".to_string()
        ]
    );
}

#[test]
fn extract_nothing_without_set_cookie() {
    assert!(extract_set_cookies(&HeaderMap::new()).is_empty());
}
