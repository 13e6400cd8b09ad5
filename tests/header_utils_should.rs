use axum::http::{HeaderMap, HeaderValue, header};
use hls_proxy::server::services::cookie_services::{CookieService, MockCookieServiceTrait};
use hls_proxy::server::utils::header_utils::{HeaderOptions, build_headers, origin_of};
use url::Url;

fn client_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/x-mpegurl"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
    headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-99"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static("VLC/3.0"));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
    headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:4321"));
    headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
    headers
}

fn value<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[test]
fn forward_only_allow_listed_client_headers() {
    let jar = CookieService::new();
    let target = Url::parse("http://h/a/seg.ts").unwrap();

    let headers = build_headers(&client_headers(), &target, &jar, &HeaderOptions::default());

    assert_eq!(value(&headers, header::ACCEPT), Some("application/x-mpegurl"));
    assert_eq!(value(&headers, header::ACCEPT_LANGUAGE), Some("en-US"));
    assert_eq!(value(&headers, header::RANGE), Some("bytes=0-99"));
    assert_eq!(value(&headers, header::CACHE_CONTROL), Some("no-cache"));
    assert!(headers.get(header::AUTHORIZATION).is_none());
    assert!(headers.get(header::ORIGIN).is_none());
    assert!(headers.get("x-forwarded-for").is_none());
    assert!(headers.get(header::USER_AGENT).is_none());
    assert!(headers.get(header::COOKIE).is_none());
}

#[test]
fn forward_user_agent_only_when_asked() {
    let jar = CookieService::new();
    let target = Url::parse("http://h/a/seg.ts").unwrap();
    let options = HeaderOptions {
        playlist_referer: None,
        keep_user_agent: true,
    };

    let headers = build_headers(&client_headers(), &target, &jar, &options);

    assert_eq!(value(&headers, header::USER_AGENT), Some("VLC/3.0"));
}

#[test]
fn use_playlist_referer_for_segments() {
    let jar = CookieService::new();
    let target = Url::parse("http://h/a/seg.ts").unwrap();
    let options = HeaderOptions {
        playlist_referer: Some("http://h/a/live.m3u8".to_string()),
        keep_user_agent: false,
    };

    let headers = build_headers(&HeaderMap::new(), &target, &jar, &options);

    assert_eq!(value(&headers, header::REFERER), Some("http://h/a/live.m3u8"));
}

#[test]
fn use_own_origin_as_referer_for_playlists() {
    let jar = CookieService::new();
    let target = Url::parse("http://h/a/LIVE.M3U8").unwrap();
    let options = HeaderOptions {
        playlist_referer: Some("http://other/x.m3u8".to_string()),
        keep_user_agent: false,
    };

    let headers = build_headers(&HeaderMap::new(), &target, &jar, &options);

    assert_eq!(value(&headers, header::REFERER), Some("http://h/"));
}

#[test]
fn fall_back_to_origin_referer_without_playlist_referer() {
    let jar = CookieService::new();
    let target = Url::parse("https://cdn.example:8443/key.bin").unwrap();

    let headers = build_headers(&HeaderMap::new(), &target, &jar, &HeaderOptions::default());

    assert_eq!(value(&headers, header::REFERER), Some("https://cdn.example:8443/"));
    assert_eq!(value(&headers, header::HOST), Some("cdn.example:8443"));
}

#[test]
fn default_accept_and_set_host() {
    let jar = CookieService::new();
    let target = Url::parse("http://panel.example/live/1.ts").unwrap();

    let headers = build_headers(&HeaderMap::new(), &target, &jar, &HeaderOptions::default());

    assert_eq!(value(&headers, header::ACCEPT), Some("*/*"));
    assert_eq!(value(&headers, header::HOST), Some("panel.example"));
}

#[test]
fn replay_cookies_for_the_target_origin() {
    let target = Url::parse("http://panel.example:8080/live/1.m3u8").unwrap();

    let mut jar = MockCookieServiceTrait::new();
    jar.expect_get_cookies()
        .withf(|origin| origin == "http://panel.example:8080")
        .times(1)
        .returning(|_| "sid=abc; lang=en".to_string());

    let headers = build_headers(&HeaderMap::new(), &target, &jar, &HeaderOptions::default());

    assert_eq!(value(&headers, header::COOKIE), Some("sid=abc; lang=en"));
}

#[test]
fn leave_out_default_ports_in_the_origin() {
    assert_eq!(
        origin_of(&Url::parse("https://h:443/a").unwrap()),
        "https://h"
    );
    assert_eq!(
        origin_of(&Url::parse("http://h:8080/a").unwrap()),
        "http://h:8080"
    );
}
