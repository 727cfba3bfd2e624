//! End-to-end refresh runs against mocked manifest, GitHub API, and asset hosts.

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modcache::cache::{hash_index_path, mods_path, read_json, write_json};
use modcache::model::{HashIndex, Mod, ModDescriptor, Provenance, Release, is_sha256_hex};
use modcache::{AppConfig, ModCacheError, Pipeline, RunOutcome};

// SHA-256 of "hello world".
const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

fn config(server: &MockServer, dir: &TempDir) -> AppConfig {
    AppConfig {
        manifest_url: format!("{}/manifest.json", server.uri()),
        repositories_file: dir.path().join("repositories.json"),
        output_dir: dir.path().join("out"),
        github_api_base: server.uri(),
        github_token: None,
        page_delay_ms: 0,
        release_delay_ms: 0,
        hash_delay_ms: 0,
        ..Default::default()
    }
}

fn manifest(repos: &[&str]) -> Value {
    let mut mods = serde_json::Map::new();
    for repo in repos {
        mods.insert(
            repo.to_string(),
            json!({
                "name": format!("Mod {repo}"),
                "description": "test mod",
                "category": "Misc",
                "sourceLocation": format!("https://github.com/owner/{repo}"),
                "tags": ["test"],
                "flags": []
            }),
        );
    }
    json!({ "owner-group": { "author": { "Owner": {} }, "mods": mods } })
}

async fn mount_manifest(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn release_json(server: &MockServer, repo: &str, tag: &str, date: &str, size: u64) -> Value {
    json!({
        "tag_name": tag,
        "html_url": format!("https://github.com/owner/{repo}/releases/tag/{tag}"),
        "published_at": date,
        "prerelease": false,
        "draft": false,
        "body": format!("{tag} changes"),
        "assets": [{
            "name": format!("{repo}-{tag}.zip"),
            "size": size,
            "browser_download_url": format!("{}/dl/{repo}/{tag}.zip", server.uri())
        }]
    })
}

async fn mount_releases(server: &MockServer, repo: &str, releases: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/owner/{repo}/releases")))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, repo: &str, tag: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/dl/{repo}/{tag}.zip")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn written_mods(dir: &TempDir) -> Vec<Mod> {
    read_json(&mods_path(&dir.path().join("out")))
        .unwrap()
        .expect("mods.json written")
}

fn written_index(dir: &TempDir) -> HashIndex {
    read_json(&hash_index_path(&dir.path().join("out")))
        .unwrap()
        .expect("hash_index.json written")
}

fn cached_mod(repo: &str) -> Mod {
    let now = Utc::now();
    let descriptor = ModDescriptor {
        name: format!("Mod {repo}"),
        description: "cached".to_string(),
        category: "Misc".to_string(),
        repository: format!("https://github.com/owner/{repo}"),
        author: "Owner".to_string(),
        tags: vec![],
        flags: vec![],
        source: Provenance::Manifest,
    };
    let release = Release {
        version: "v0.9".to_string(),
        download_url: format!("https://example.com/{repo}.zip"),
        release_url: String::new(),
        published_at: now - Duration::days(30),
        prerelease: false,
        draft: false,
        changelog: String::new(),
        file_name: format!("{repo}.zip"),
        file_size: 42,
        sha256: Some("1".repeat(64)),
    };
    Mod::assemble(descriptor, vec![release], now, Some(now))
}

#[tokio::test]
async fn test_release_without_asset_is_dropped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["alpha"])).await;

    let mut assetless = release_json(&server, "alpha", "v0.1", "2024-01-01T00:00:00Z", 11);
    assetless["assets"] = json!([]);
    mount_releases(
        &server,
        "alpha",
        json!([
            release_json(&server, "alpha", "v1.0", "2024-02-01T00:00:00Z", 999),
            assetless
        ]),
    )
    .await;
    mount_asset(&server, "alpha", "v1.0", b"hello world").await;

    let report = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();
    assert_eq!(report.outcome, RunOutcome::Written);

    let mods = written_mods(&dir);
    assert_eq!(mods.len(), 1);
    assert_eq!(mods[0].releases.len(), 1);

    let release = &mods[0].releases[0];
    assert_eq!(release.version, "v1.0");
    assert_eq!(release.sha256.as_deref(), Some(HELLO_SHA256));
    // Downloaded length replaces the size reported by the API.
    assert_eq!(release.file_size, 11);
    assert_eq!(mods[0].latest.as_ref().unwrap().version, "v1.0");

    let index = written_index(&dir);
    let records = &index[HELLO_SHA256];
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mod_name, "Mod alpha");
    assert!(index.keys().all(|k| is_sha256_hex(k)));
    assert!(index.values().all(|rs| rs.iter().any(|r| !r.download_url.is_empty())));
}

#[tokio::test]
async fn test_missing_repository_list_uses_manifest_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["alpha", "beta"])).await;
    mount_releases(&server, "alpha", json!([])).await;
    mount_releases(&server, "beta", json!([])).await;

    let report = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Written);
    assert_eq!(report.stats.mods_total, 2);
    let mods = written_mods(&dir);
    assert!(mods.iter().all(|m| m.descriptor.source == Provenance::Manifest));
}

#[tokio::test]
async fn test_additional_repositories_are_merged() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["alpha"])).await;
    mount_releases(&server, "alpha", json!([])).await;
    mount_releases(&server, "extra", json!([])).await;
    std::fs::write(
        dir.path().join("repositories.json"),
        r#"{ "repositories": [
            { "name": "Extra", "repository": "https://github.com/owner/extra" },
            { "name": "Disabled", "repository": "https://github.com/owner/off", "enabled": false }
        ] }"#,
    )
    .unwrap();

    Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();

    let mods = written_mods(&dir);
    let names: Vec<_> = mods.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Mod alpha", "Extra"]);
    assert_eq!(mods[1].descriptor.source, Provenance::Additional);
}

#[tokio::test]
async fn test_rate_limit_mid_run_carries_cache_forward() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let repos: Vec<String> = (1..=10).map(|i| format!("m{i}")).collect();
    let repo_refs: Vec<&str> = repos.iter().map(String::as_str).collect();
    mount_manifest(&server, manifest(&repo_refs)).await;

    for repo in &repos[..4] {
        mount_releases(
            &server,
            repo,
            json!([release_json(&server, repo, "v1", "2024-01-01T00:00:00Z", 11)]),
        )
        .await;
        mount_asset(&server, repo, "v1", b"hello world").await;
    }
    Mock::given(method("GET"))
        .and(path("/repos/owner/m5/releases"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .set_body_string(r#"{"message":"API rate limit exceeded"}"#),
        )
        .mount(&server)
        .await;
    for repo in &repos[5..] {
        Mock::given(method("GET"))
            .and(path(format!("/repos/owner/{repo}/releases")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let out = dir.path().join("out");
    let prior = vec![cached_mod("m5"), cached_mod("m6"), cached_mod("m7")];
    write_json(&mods_path(&out), &prior).unwrap();

    let report = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .expect("rate limit is not fatal");

    assert_eq!(report.outcome, RunOutcome::RateLimitedPartial);
    assert_eq!(report.stats.mods_processed, 4);
    assert_eq!(report.stats.mods_carried_forward, 3);

    let mods = written_mods(&dir);
    let names: Vec<_> = mods.iter().map(|m| m.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["Mod m1", "Mod m2", "Mod m3", "Mod m4", "Mod m5", "Mod m6", "Mod m7"]
    );
    for m in &mods[..4] {
        assert_eq!(m.releases.len(), 1);
        assert_eq!(m.releases[0].sha256.as_deref(), Some(HELLO_SHA256));
    }
    assert_eq!(mods[4..], prior[..]);
}

#[tokio::test]
async fn test_oversized_asset_written_without_hash() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["big"])).await;
    mount_releases(
        &server,
        "big",
        json!([release_json(&server, "big", "v1", "2024-01-01T00:00:00Z", 4096)]),
    )
    .await;
    mount_asset(&server, "big", "v1", &[7u8; 64]).await;

    let config = AppConfig {
        max_asset_bytes: 16,
        ..config(&server, &dir)
    };
    let report = Pipeline::new(config).unwrap().run(false).await.unwrap();
    assert_eq!(report.outcome, RunOutcome::Written);
    assert_eq!(report.stats.hashes.oversized, 1);

    let mods = written_mods(&dir);
    let release = &mods[0].releases[0];
    assert!(release.sha256.is_none());
    assert_eq!(release.file_size, 4096);
    assert!(written_index(&dir).is_empty());

    let raw: Value = read_json(&mods_path(&dir.path().join("out"))).unwrap().unwrap();
    assert!(raw[0]["releases"][0]["sha256"].is_null());
}

#[tokio::test]
async fn test_second_run_reuses_all_hashes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["alpha"])).await;
    mount_releases(
        &server,
        "alpha",
        json!([
            release_json(&server, "alpha", "v2", "2024-02-01T00:00:00Z", 11),
            release_json(&server, "alpha", "v1", "2024-01-01T00:00:00Z", 11)
        ]),
    )
    .await;
    for tag in ["v1", "v2"] {
        Mock::given(method("GET"))
            .and(path(format!("/dl/alpha/{tag}.zip")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let first = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();
    assert_eq!(first.stats.hashes.computed, 2);
    let mut first_mods = written_mods(&dir);

    let second = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();
    assert_eq!(second.stats.hashes.computed, 0);
    assert_eq!(second.stats.hashes.reused, 2);
    let mut second_mods = written_mods(&dir);

    let epoch = chrono::DateTime::<Utc>::UNIX_EPOCH;
    for m in first_mods.iter_mut().chain(second_mods.iter_mut()) {
        m.last_updated = epoch;
    }
    assert_eq!(first_mods, second_mods);

    // Both versions share a binary, so the index holds two records under one key.
    let index = written_index(&dir);
    assert_eq!(index[HELLO_SHA256].len(), 2);
}

#[tokio::test]
async fn test_same_named_mods_keep_their_own_hashes() {
    const A_SHA256: &str = "b460b5e1ae49666ebd55a9ae257920048b542478107ca2fdf2cd518fbd7cebd9";
    const B_SHA256: &str = "cd963e76e9d09ea8d387c3b0d0528d0d306b6ee25278b85eaebf92f8221bbf05";

    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let entry = |owner: &str| {
        json!({
            "name": "Utility",
            "description": "same name, different repository",
            "category": "Misc",
            "sourceLocation": format!("https://github.com/{owner}/util"),
            "tags": [],
            "flags": []
        })
    };
    mount_manifest(
        &server,
        json!({
            "ga": { "author": { "Group A": {} }, "mods": { "util": entry("a") } },
            "gb": { "author": { "Group B": {} }, "mods": { "util": entry("b") } }
        }),
    )
    .await;

    for (owner, body) in [("a", b"utility from a"), ("b", b"utility from b")] {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{owner}/util/releases")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "tag_name": "v1",
                "published_at": "2024-01-01T00:00:00Z",
                "assets": [{
                    "name": "util.zip",
                    "size": body.len(),
                    "browser_download_url": format!("{}/dl/{owner}/util/v1.zip", server.uri())
                }]
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/dl/{owner}/util/v1.zip")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    for run in 0..2 {
        let report = Pipeline::new(config(&server, &dir))
            .unwrap()
            .run(false)
            .await
            .unwrap();
        if run == 1 {
            assert_eq!(report.stats.hashes.reused, 2);
        }

        let mods = written_mods(&dir);
        assert_eq!(mods.len(), 2);
        let hashes: Vec<_> = mods
            .iter()
            .map(|m| (m.descriptor.repository.as_str(), m.releases[0].sha256.as_deref()))
            .collect();
        assert_eq!(
            hashes,
            vec![
                ("https://github.com/a/util", Some(A_SHA256)),
                ("https://github.com/b/util", Some(B_SHA256)),
            ],
            "run {run}"
        );

        let index = written_index(&dir);
        assert_eq!(index[A_SHA256].len(), 1);
        assert_eq!(index[B_SHA256].len(), 1);
    }
}

#[tokio::test]
async fn test_force_hash_recomputes_fresh_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(&server, manifest(&["alpha"])).await;
    mount_releases(
        &server,
        "alpha",
        json!([release_json(&server, "alpha", "v1", "2024-01-01T00:00:00Z", 11)]),
    )
    .await;
    mount_asset(&server, "alpha", "v1", b"hello world").await;

    Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();
    let forced = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(true)
        .await
        .unwrap();

    assert_eq!(forced.stats.hashes.computed, 1);
    assert_eq!(forced.stats.hashes.reused, 0);
}

#[tokio::test]
async fn test_mod_without_repository_keeps_empty_releases() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_manifest(
        &server,
        json!({ "g": { "author": { "A": {} }, "mods": {
            "web": { "name": "Web Only", "sourceLocation": "https://example.com/mod" }
        } } }),
    )
    .await;

    let report = Pipeline::new(config(&server, &dir))
        .unwrap()
        .run(false)
        .await
        .unwrap();
    assert_eq!(report.outcome, RunOutcome::Written);

    let mods = written_mods(&dir);
    assert_eq!(mods.len(), 1);
    assert!(mods[0].releases.is_empty());
    assert!(mods[0].latest.is_none());
}

#[tokio::test]
async fn test_manifest_failure_aborts_without_writing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = Pipeline::new(config(&server, &dir)).unwrap().run(false).await;

    assert!(matches!(result, Err(ModCacheError::Manifest(_))));
    assert!(!mods_path(&dir.path().join("out")).exists());
}
