//! 链接生命周期集成测试
//!
//! 覆盖创建、路径分配、过期策略、密码校验和垃圾回收。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use shortpath::config::LinksConfig;
use shortpath::errors::ShortpathError;
use shortpath::services::{
    CreateLinkRequest, ExpiryInput, GarbageCollector, LinkResolver, LinkService, Resolution,
};
use shortpath::storage::{
    Link, LinkInfo, LinkStore, MemoryStore, StoreError, StoreResult, never_expires,
};

// =============================================================================
// 测试辅助
// =============================================================================

fn links_config() -> LinksConfig {
    LinksConfig {
        default_short_length: 3,
        max_short_length: 6,
        max_custom_length: 8,
        default_expiry_minutes: 60,
        cleanup_interval_minutes: 1,
    }
}

fn setup() -> (Arc<MemoryStore>, LinkService, LinkResolver) {
    let store = Arc::new(MemoryStore::new());
    let service = LinkService::new(store.clone(), &links_config());
    let resolver = LinkResolver::new(store.clone());
    (store, service, resolver)
}

fn request(url: &str) -> CreateLinkRequest {
    CreateLinkRequest {
        url: url.to_string(),
        ..Default::default()
    }
}

/// 前 `collisions` 次插入全部报冲突，之后交给内存存储
struct CollidingStore {
    inner: MemoryStore,
    collisions: usize,
    attempts: AtomicUsize,
    attempted_lengths: std::sync::Mutex<Vec<usize>>,
}

impl CollidingStore {
    fn new(collisions: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            collisions,
            attempts: AtomicUsize::new(0),
            attempted_lengths: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LinkStore for CollidingStore {
    async fn create_link(&self, link: &Link) -> StoreResult<()> {
        self.attempted_lengths.lock().unwrap().push(link.short.len());
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.collisions {
            return Err(StoreError::UniqueViolation(link.short.clone()));
        }
        self.inner.create_link(link).await
    }

    async fn get_url_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.inner.get_url_by_short(short).await
    }

    async fn get_hash_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.inner.get_hash_by_short(short).await
    }

    async fn get_link_info(&self, short: &str) -> StoreResult<Option<LinkInfo>> {
        self.inner.get_link_info(short).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.inner.delete_expired(now).await
    }

    async fn delete_by_short(&self, short: &str) -> StoreResult<bool> {
        self.inner.delete_by_short(short).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "colliding"
    }
}

/// 前 `failures` 次清理返回错误，之后交给内存存储
struct FailingSweepStore {
    inner: MemoryStore,
    failures: usize,
    sweeps: AtomicUsize,
}

#[async_trait]
impl LinkStore for FailingSweepStore {
    async fn create_link(&self, link: &Link) -> StoreResult<()> {
        self.inner.create_link(link).await
    }

    async fn get_url_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.inner.get_url_by_short(short).await
    }

    async fn get_hash_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        self.inner.get_hash_by_short(short).await
    }

    async fn get_link_info(&self, short: &str) -> StoreResult<Option<LinkInfo>> {
        self.inner.get_link_info(short).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let sweep = self.sweeps.fetch_add(1, Ordering::SeqCst);
        if sweep < self.failures {
            return Err(StoreError::Operation("database is locked".to_string()));
        }
        self.inner.delete_expired(now).await
    }

    async fn delete_by_short(&self, short: &str) -> StoreResult<bool> {
        self.inner.delete_by_short(short).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "failing-sweep"
    }
}

fn expired_link(short: &str) -> Link {
    Link {
        id: uuid::Uuid::new_v4(),
        created_at: Utc::now() - Duration::hours(2),
        expire_at: Utc::now() - Duration::hours(1),
        url: "https://example.com".to_string(),
        short: short.to_string(),
        password_hash: String::new(),
    }
}

// =============================================================================
// 创建与解析
// =============================================================================

#[tokio::test]
async fn test_generated_path_round_trip() {
    let (store, service, resolver) = setup();

    let created = service
        .create_link(request("https://example.com/page"))
        .await
        .unwrap();

    assert_eq!(created.link.short.len(), 3);
    assert!(created.link.short.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(!created.length_changed);
    assert_eq!(store.len(), 1);

    let resolution = resolver.resolve(&created.link.short, None).await.unwrap();
    assert_eq!(
        resolution,
        Resolution::Redirect {
            url: "https://example.com/page".to_string()
        }
    );
}

#[tokio::test]
async fn test_requested_length_is_clamped_to_max() {
    let (_store, service, _) = setup();

    let created = service
        .create_link(CreateLinkRequest {
            length: 50,
            ..request("https://example.com")
        })
        .await
        .unwrap();
    assert_eq!(created.link.short.len(), 6);
}

#[tokio::test]
async fn test_custom_path_is_truncated() {
    let (store, service, resolver) = setup();

    let created = service
        .create_link(CreateLinkRequest {
            custom_path: Some("abcdefghijkl".to_string()),
            ..request("https://example.com")
        })
        .await
        .unwrap();

    assert_eq!(created.link.short, "abcdefgh");
    assert!(store.contains("abcdefgh"));
    assert!(resolver.resolve("abcdefgh", None).await.is_ok());
}

#[tokio::test]
async fn test_custom_path_with_symbols_is_rejected_without_insert() {
    let (store, service, _) = setup();

    let err = service
        .create_link(CreateLinkRequest {
            custom_path: Some("my-link".to_string()),
            ..request("https://example.com")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ShortpathError::Validation(_)));
    assert!(err.message().contains('-'));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_reserved_custom_path_is_rejected() {
    let (store, service, _) = setup();

    for reserved in ["status", "access", "assets", "assetsXYZ"] {
        let err = service
            .create_link(CreateLinkRequest {
                custom_path: Some(reserved.to_string()),
                ..request("https://example.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ShortpathError::Validation(_)), "{}", reserved);
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_duplicate_custom_path_is_conflict() {
    let (store, service, _) = setup();
    let req = CreateLinkRequest {
        custom_path: Some("docs".to_string()),
        ..request("https://example.com/a")
    };

    service.create_link(req.clone()).await.unwrap();
    let err = service
        .create_link(CreateLinkRequest {
            url: "https://example.com/b".to_string(),
            ..req
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ShortpathError::Conflict(_)));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let (store, service, _) = setup();

    for url in ["", "ftp://example.com", "https://localhost", "not a url"] {
        let err = service.create_link(request(url)).await.unwrap_err();
        assert!(matches!(err, ShortpathError::Validation(_)), "{}", url);
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_url_with_control_characters_is_rejected() {
    let (store, service, _) = setup();

    for url in [
        "https://example.com/a\r\nSet-Cookie: x=1",
        "https://example.com/\tpath",
    ] {
        let err = service.create_link(request(url)).await.unwrap_err();
        assert!(matches!(err, ShortpathError::Validation(_)), "{:?}", url);
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_repeated_reads_are_idempotent() {
    let (store, service, resolver) = setup();
    let created = service
        .create_link(request("https://example.com"))
        .await
        .unwrap();

    let first = resolver.resolve(&created.link.short, None).await.unwrap();
    for _ in 0..5 {
        assert_eq!(
            resolver.resolve(&created.link.short, None).await.unwrap(),
            first
        );
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_info_marker_returns_metadata() {
    let (_store, service, resolver) = setup();
    let created = service
        .create_link(request("https://example.com"))
        .await
        .unwrap();

    let info_path = format!("{}+", created.link.short);
    match resolver.resolve(&info_path, None).await.unwrap() {
        Resolution::Info(info) => {
            assert_eq!(info.url, "https://example.com");
            assert_eq!(info.short, created.link.short);
            assert_eq!(info.expire_at, created.link.expire_at);
        }
        other => panic!("expected info, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_short_is_not_found() {
    let (_store, _service, resolver) = setup();
    let err = resolver.resolve("nothing", None).await.unwrap_err();
    assert!(matches!(err, ShortpathError::NotFound(_)));
}

// =============================================================================
// 过期策略
// =============================================================================

#[tokio::test]
async fn test_explicit_date_beats_relative() {
    let (_store, service, _) = setup();

    let created = service
        .create_link(CreateLinkRequest {
            expiry: ExpiryInput::Fields {
                expire_date: Some("2099-01-01T12:30".to_string()),
                expire_after: Some("5m".to_string()),
            },
            ..request("https://example.com")
        })
        .await
        .unwrap();

    assert_eq!(
        created.link.expire_at.format("%Y-%m-%dT%H:%M").to_string(),
        "2099-01-01T12:30"
    );
}

#[tokio::test]
async fn test_relative_expiry() {
    let (_store, service, _) = setup();
    let before = Utc::now();

    let created = service
        .create_link(CreateLinkRequest {
            expiry: ExpiryInput::Fields {
                expire_date: None,
                expire_after: Some("2h".to_string()),
            },
            ..request("https://example.com")
        })
        .await
        .unwrap();

    let lifetime = created.link.expire_at - before;
    assert!(lifetime >= Duration::hours(2));
    assert!(lifetime < Duration::hours(2) + Duration::minutes(1));
}

#[tokio::test]
async fn test_default_minutes_apply_without_input() {
    let (_store, service, _) = setup();
    let before = Utc::now();

    let created = service
        .create_link(request("https://example.com"))
        .await
        .unwrap();

    let lifetime = created.link.expire_at - before;
    assert!(lifetime >= Duration::minutes(60));
    assert!(lifetime < Duration::minutes(61));
}

#[tokio::test]
async fn test_never_expiring_link_uses_max_length() {
    let (_store, service, _) = setup();

    let created = service
        .create_link(CreateLinkRequest {
            length: 3,
            expiry: ExpiryInput::Minutes(-1),
            ..request("https://example.com")
        })
        .await
        .unwrap();

    assert_eq!(created.link.expire_at, never_expires());
    assert!(created.link.never_expires());
    assert_eq!(created.link.short.len(), 6);
}

#[tokio::test]
async fn test_unparsable_expiry_is_rejected() {
    let (store, service, _) = setup();

    for (date, after) in [
        (Some("tomorrow"), None),
        (None, Some("3 fortnights")),
        (Some("2001-01-01T00:00"), None),
    ] {
        let err = service
            .create_link(CreateLinkRequest {
                expiry: ExpiryInput::Fields {
                    expire_date: date.map(str::to_string),
                    expire_after: after.map(str::to_string),
                },
                ..request("https://example.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ShortpathError::Validation(_)));
    }
    assert!(store.is_empty());
}

// =============================================================================
// 密码
// =============================================================================

#[tokio::test]
async fn test_password_gate() {
    let (_store, service, resolver) = setup();
    let created = service
        .create_link(CreateLinkRequest {
            password: Some("hunter2".to_string()),
            ..request("https://example.com/secret")
        })
        .await
        .unwrap();
    let short = created.link.short.clone();
    assert!(created.link.is_protected());

    assert_eq!(
        resolver.resolve(&short, None).await.unwrap(),
        Resolution::Challenge {
            short: short.clone()
        }
    );

    let err = resolver
        .resolve(&short, Some("wrong".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ShortpathError::AuthFailure(_)));

    assert_eq!(
        resolver
            .resolve(&short, Some("hunter2".to_string()))
            .await
            .unwrap(),
        Resolution::Redirect {
            url: "https://example.com/secret".to_string()
        }
    );

    // 信息请求同样受密码保护
    let info_path = format!("{}+", short);
    assert!(matches!(
        resolver.resolve(&info_path, None).await.unwrap(),
        Resolution::Challenge { .. }
    ));
}

#[tokio::test]
async fn test_empty_password_means_unprotected() {
    let (_store, service, resolver) = setup();
    let created = service
        .create_link(CreateLinkRequest {
            password: Some(String::new()),
            ..request("https://example.com")
        })
        .await
        .unwrap();

    assert!(!created.link.is_protected());
    assert!(matches!(
        resolver.resolve(&created.link.short, None).await.unwrap(),
        Resolution::Redirect { .. }
    ));
}

#[tokio::test]
async fn test_empty_supplied_password_is_challenged() {
    let (_store, service, resolver) = setup();
    let created = service
        .create_link(CreateLinkRequest {
            password: Some("hunter2".to_string()),
            ..request("https://example.com/secret")
        })
        .await
        .unwrap();

    // 空字符串等同于未提供密码
    assert!(matches!(
        resolver
            .resolve(&created.link.short, Some(String::new()))
            .await
            .unwrap(),
        Resolution::Challenge { .. }
    ));
}

#[tokio::test]
async fn test_corrupt_stored_hash_is_internal_error() {
    let (store, _service, resolver) = setup();
    let broken = Link {
        password_hash: "garbage".to_string(),
        expire_at: never_expires(),
        ..expired_link("broken")
    };
    store.create_link(&broken).await.unwrap();

    // 未提供密码时仍然只是要求输入
    assert!(matches!(
        resolver.resolve("broken", None).await.unwrap(),
        Resolution::Challenge { .. }
    ));

    let err = resolver
        .resolve("broken", Some("x".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ShortpathError::Internal(_)), "{:?}", err);
    assert!(!err.is_client_fault());
}

// =============================================================================
// 冲突升级
// =============================================================================

#[tokio::test]
async fn test_always_colliding_store_is_exhausted() {
    let store = Arc::new(CollidingStore::new(usize::MAX));
    let service = LinkService::new(store.clone(), &links_config());

    let err = service
        .create_link(request("https://example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ShortpathError::Exhausted(_)));
    // 长度 3..=6 每个尝试一次
    assert_eq!(*store.attempted_lengths.lock().unwrap(), vec![3, 4, 5, 6]);
    assert_eq!(store.inner.len(), 0);
}

#[tokio::test]
async fn test_collision_escalates_length_and_reports_it() {
    let store = Arc::new(CollidingStore::new(2));
    let service = LinkService::new(store.clone(), &links_config());

    let created = service
        .create_link(request("https://example.com"))
        .await
        .unwrap();

    assert_eq!(created.link.short.len(), 5);
    assert!(created.length_changed);
    assert_eq!(store.inner.len(), 1);
}

#[tokio::test]
async fn test_custom_path_collision_does_not_escalate() {
    let store = Arc::new(CollidingStore::new(1));
    let service = LinkService::new(store.clone(), &links_config());

    let err = service
        .create_link(CreateLinkRequest {
            custom_path: Some("docs".to_string()),
            ..request("https://example.com")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ShortpathError::Conflict(_)));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
}

// =============================================================================
// 删除与垃圾回收
// =============================================================================

#[tokio::test]
async fn test_remove_link() {
    let (store, service, resolver) = setup();
    let created = service
        .create_link(request("https://example.com"))
        .await
        .unwrap();

    service.remove_link(&created.link.short).await.unwrap();
    assert!(store.is_empty());
    assert!(resolver.resolve(&created.link.short, None).await.is_err());

    let err = service.remove_link(&created.link.short).await.unwrap_err();
    assert!(matches!(err, ShortpathError::NotFound(_)));
}

#[tokio::test]
async fn test_sweep_keeps_only_unexpired_link() {
    let (store, service, resolver) = setup();

    let short_lived = service
        .create_link(CreateLinkRequest {
            expiry: ExpiryInput::Minutes(1),
            ..request("https://example.com/short")
        })
        .await
        .unwrap();
    let also_short = service
        .create_link(CreateLinkRequest {
            expiry: ExpiryInput::Minutes(2),
            ..request("https://example.com/also-short")
        })
        .await
        .unwrap();
    let long_lived = service
        .create_link(CreateLinkRequest {
            expiry: ExpiryInput::Minutes(120),
            ..request("https://example.com/long")
        })
        .await
        .unwrap();

    let gc = GarbageCollector::from_minutes(store.clone(), 1);
    let deleted = gc
        .sweep_at(Utc::now() + Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(store.len(), 1);
    for gone in [&short_lived, &also_short] {
        let err = resolver.resolve(&gone.link.short, None).await.unwrap_err();
        assert!(matches!(err, ShortpathError::NotFound(_)));
    }
    assert!(resolver.resolve(&long_lived.link.short, None).await.is_ok());
}

#[tokio::test]
async fn test_spawned_collector_sweeps_immediately_and_stops() {
    let store = Arc::new(MemoryStore::new());
    store.create_link(&expired_link("old")).await.unwrap();

    let handle =
        GarbageCollector::new(store.clone(), std::time::Duration::from_secs(3600)).spawn();

    // 第一次清理在启动后立即执行
    for _ in 0..50 {
        if store.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(store.is_empty());

    tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
        .await
        .expect("collector should stop promptly");
}

#[tokio::test]
async fn test_collector_keeps_running_after_failed_sweep() {
    let store = Arc::new(FailingSweepStore {
        inner: MemoryStore::new(),
        failures: 1,
        sweeps: AtomicUsize::new(0),
    });
    store.create_link(&expired_link("old")).await.unwrap();

    let handle =
        GarbageCollector::new(store.clone(), std::time::Duration::from_millis(20)).spawn();

    // 第一次清理失败，后续 tick 仍会继续
    for _ in 0..100 {
        if store.inner.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(store.inner.is_empty());
    assert!(store.sweeps.load(Ordering::SeqCst) >= 2);

    tokio::time::timeout(std::time::Duration::from_secs(5), handle.shutdown())
        .await
        .expect("collector should stop promptly");
}
