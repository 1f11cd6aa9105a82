use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::jobs::{QueueSettings, UploadQueue};
use crate::storage::{SeaOrmStorage, Storage};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub queue: UploadQueue,
    pub worker: JoinHandle<()>,
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    // 根据配置选择缓存后端
    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => {
                warn!("Failed to create {} cache: {}", cache_type, e);

                // 如果配置的缓存失败，尝试回退策略
                if cache_type == "redis" {
                    warn!("Falling back to memory cache");
                    if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                        match fallback_constructor().await {
                            Ok(cache) => {
                                warn!(
                                    "Successfully created fallback Moka (in-memory) cache backend"
                                );
                                return Ok(Arc::from(cache));
                            }
                            Err(fallback_e) => {
                                warn!("Failed to create fallback Moka cache: {}", fallback_e);
                            }
                        }
                    }
                }
            }
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);

        // 如果找不到配置的缓存类型，尝试默认的内存缓存
        if cache_type != "moka" {
            warn!("Falling back to default memory cache");
            if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                match fallback_constructor().await {
                    Ok(cache) => {
                        warn!("Successfully created fallback Moka (in-memory) cache backend");
                        return Ok(Arc::from(cache));
                    }
                    Err(fallback_e) => {
                        warn!("Failed to create fallback Moka cache: {}", fallback_e);
                    }
                }
            }
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 保证基础科目存在
async fn seed_subjects(storage: &Arc<dyn Storage>, names: &[String]) {
    if names.is_empty() {
        debug!("No seed subjects configured, skipping subject seed");
        return;
    }

    match storage.ensure_subjects(names).await {
        Ok(subjects) => {
            info!(
                "Subject catalogue ready ({} seeded): {}",
                subjects.len(),
                subjects
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Err(e) => {
            warn!("Failed to seed subjects: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和上传任务队列
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let config = AppConfig::get();

    let storage: Arc<dyn Storage> = Arc::new(
        SeaOrmStorage::connect(&config.database)
            .await
            .expect("Failed to create storage backend"),
    );
    warn!("Storage backend initialized and migrations completed");

    // 初始化科目目录
    seed_subjects(&storage, &config.import.seed_subjects).await;

    // 创建缓存实例
    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    // 启动上传任务 worker
    let (queue, worker) = UploadQueue::start(
        storage.clone(),
        cache.clone(),
        QueueSettings::from_config(&config.import),
    );
    warn!(
        "Upload worker started (capacity: {}, max attempts: {})",
        config.import.queue_capacity, config.import.max_attempts
    );

    StartupContext {
        storage,
        cache,
        queue,
        worker,
    }
}
