//! # Service Registry - 싱글톤 의존성 주입 컨테이너
//!
//! 게이트웨이 프로세스 전역에서 공유되는 컴포넌트(Redis 클라이언트, 세션 리포지토리,
//! 세션 서비스 등)를 타입 단위로 보관하는 서비스 로케이터입니다.
//!
//! ## 동작 방식
//!
//! ```text
//! 1. 컴파일 타임
//!    ├─ #[service] 매크로 → ServiceRegistration 생성
//!    ├─ #[repository] 매크로 → RepositoryRegistration 생성
//!    └─ inventory::collect! → 전역 레지스트리에 등록
//!
//! 2. 런타임 초기화
//!    ├─ RedisClient 등 인프라 컴포넌트 직접 등록 (ServiceLocator::set)
//!    └─ ServiceLocator::initialize_all() → 리포지토리, 서비스 순서로 생성
//!
//! 3. 조회
//!    ├─ Arc<T> 필드 → ServiceLocator::get::<T>()
//!    └─ 이후 동일 타입 요청 시 캐시된 인스턴스 반환
//! ```
//!
//! ## 이름 규칙
//!
//! 타입 이름의 접미사(`Service`, `Repository`)를 제거하고 소문자로 바꾼 값이
//! 매크로의 `name` 속성과 일치해야 합니다.
//!
//! | 타입 | 매크로 |
//! |------|--------|
//! | `SessionService` | `#[service(name = "session")]` |
//! | `SessionRepository` | `#[repository(name = "session", collection = "sessions")]` |

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use crate::utils::display_terminal::{print_boxed_title, print_cache_initialized, print_final_summary, print_step_complete, print_step_start, print_sub_task};

/// 서비스 컴포넌트 공통 트레이트
#[async_trait]
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

/// 리포지토리 컴포넌트 공통 트레이트
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    /// 저장소 내 네임스페이스 (Redis 키 접두사 등)
    fn collection_name(&self) -> &str;

    async fn init(&self) -> Result<(), Box<dyn std::error::Error>>;
}

pub struct ServiceRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

pub struct RepositoryRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Any + Send + Sync>,
}

inventory::collect!(ServiceRegistration);
inventory::collect!(RepositoryRegistration);

static SERVICE_NAME_CACHE: Lazy<HashMap<String, &'static ServiceRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<ServiceRegistration>()
        .map(|registration| (extract_clean_name_static(registration.name), registration))
        .collect();

    print_cache_initialized("Service", cache.len());
    cache
});

static REPOSITORY_NAME_CACHE: Lazy<HashMap<String, &'static RepositoryRegistration>> = Lazy::new(|| {
    let cache: HashMap<_, _> = inventory::iter::<RepositoryRegistration>()
        .map(|registration| (extract_clean_name_static(registration.name), registration))
        .collect();

    print_cache_initialized("Repository", cache.len());
    cache
});

fn extract_clean_name_static(name: &str) -> String {
    if let Some(stripped) = name.strip_suffix("_service") {
        stripped.to_string()
    } else if let Some(stripped) = name.strip_suffix("_repository") {
        stripped.to_string()
    } else {
        name.to_string()
    }
}

/// 전역 싱글톤 컨테이너
pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    initializing: RwLock<HashSet<TypeId>>,
}

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            initializing: RwLock::new(HashSet::new()),
        }
    }

    /// 등록된 인스턴스를 반환하고, 없으면 매크로 레지스트리에서 생성합니다.
    ///
    /// # Panics
    ///
    /// * 순환 참조가 감지된 경우
    /// * 수동 등록도 매크로 등록도 되지 않은 타입인 경우
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        if let Some(instance) = Self::try_get::<T>() {
            return instance;
        }

        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        {
            let mut initializing = LOCATOR.initializing.write().unwrap_or_else(PoisonError::into_inner);
            if !initializing.insert(type_id) {
                log::error!("Circular dependency detected for type: {}", type_name);
                panic!("Circular dependency detected: {} is already being initialized", type_name);
            }
        }

        let created = Self::construct::<T>(type_name);

        LOCATOR.initializing.write().unwrap_or_else(PoisonError::into_inner).remove(&type_id);

        match created {
            Some(instance) => {
                let mut instances = LOCATOR.instances.write().unwrap_or_else(PoisonError::into_inner);
                let stored = instances
                    .entry(type_id)
                    .or_insert_with(|| instance.clone() as Arc<dyn Any + Send + Sync>)
                    .clone();
                stored.downcast::<T>().unwrap_or(instance)
            }
            None => panic!(
                "Service not found: {}. Make sure it's registered with #[service] or #[repository] macro, or manually registered with ServiceLocator::set()",
                type_name
            ),
        }
    }

    /// 이미 생성되었거나 수동 등록된 인스턴스만 조회합니다.
    pub fn try_get<T: 'static + Send + Sync>() -> Option<Arc<T>> {
        let instances = LOCATOR.instances.read().unwrap_or_else(PoisonError::into_inner);
        instances
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.clone().downcast::<T>().ok())
    }

    fn construct<T: 'static + Send + Sync>(type_name: &str) -> Option<Arc<T>> {
        let clean_type_name = Self::extract_clean_type_name(type_name);

        let boxed_instance = if let Some(entity) = clean_type_name.strip_suffix("Repository") {
            REPOSITORY_NAME_CACHE
                .get(&entity.to_lowercase())
                .map(|registration| (registration.constructor)())
        } else if let Some(entity) = clean_type_name.strip_suffix("Service") {
            SERVICE_NAME_CACHE
                .get(&entity.to_lowercase())
                .map(|registration| (registration.constructor)())
        } else {
            None
        }?;

        match boxed_instance.downcast::<Arc<T>>() {
            Ok(arc_instance) => Some(*arc_instance),
            Err(_) => {
                log::error!("Type mismatch in ServiceLocator for {}", type_name);
                None
            }
        }
    }

    fn extract_clean_type_name(type_name: &str) -> String {
        // 제네릭 인자는 무시합니다
        let base = type_name.split('<').next().unwrap_or(type_name);
        match base.rfind("::") {
            Some(pos) => base[pos + 2..].to_string(),
            None => base.to_string(),
        }
    }

    /// 인스턴스를 수동 등록합니다. 같은 타입이 있으면 교체됩니다.
    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        let type_id = TypeId::of::<T>();
        let clean_name = Self::extract_clean_type_name(std::any::type_name::<T>());

        log::info!("📦 Registering: {}", clean_name);

        let mut instances = LOCATOR.instances.write().unwrap_or_else(PoisonError::into_inner);
        instances.insert(type_id, instance as Arc<dyn Any + Send + Sync>);
    }

    /// 매크로로 등록된 모든 리포지토리와 서비스를 미리 생성합니다.
    pub async fn initialize_all() -> Result<(), Box<dyn std::error::Error>> {
        print_boxed_title("🔄 INITIALIZING SERVICE REGISTRY");

        let repo_registrations: Vec<_> = inventory::iter::<RepositoryRegistration>().collect();
        let repo_count = repo_registrations.len();

        if repo_count > 0 {
            print_step_start(1, "Creating Repository instances");
            for registration in repo_registrations {
                print_sub_task(registration.name, "Creating...");
                let _boxed_instance = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }
            print_step_complete(1, "Repository instances created", repo_count);
        }

        let service_registrations: Vec<_> = inventory::iter::<ServiceRegistration>().collect();
        let service_count = service_registrations.len();

        if service_count > 0 {
            print_step_start(2, "Creating Service instances");
            for registration in service_registrations {
                print_sub_task(registration.name, "Creating...");
                let _boxed_instance = (registration.constructor)();
                print_sub_task(registration.name, "✓ Created");
            }
            print_step_complete(2, "Service instances created", service_count);
        }

        print_final_summary(repo_count, service_count);

        Ok(())
    }
}

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualComponent {
        value: u32,
    }

    #[test]
    fn test_set_and_try_get() {
        ServiceLocator::set(Arc::new(ManualComponent { value: 7 }));

        let component = ServiceLocator::try_get::<ManualComponent>().expect("registered");
        assert_eq!(component.value, 7);

        // get 은 수동 등록된 인스턴스를 그대로 돌려준다
        let same = ServiceLocator::get::<ManualComponent>();
        assert!(Arc::ptr_eq(&component, &same));
    }

    #[test]
    fn test_try_get_missing_type() {
        struct NeverRegistered;
        assert!(ServiceLocator::try_get::<NeverRegistered>().is_none());
    }

    #[test]
    fn test_clean_names() {
        assert_eq!(extract_clean_name_static("session_service"), "session");
        assert_eq!(extract_clean_name_static("session_repository"), "session");
        assert_eq!(extract_clean_name_static("session"), "session");
        assert_eq!(
            ServiceLocator::extract_clean_type_name("openapi_auth::services::sessions::SessionService"),
            "SessionService"
        );
        assert_eq!(
            ServiceLocator::extract_clean_type_name("openapi_auth::caching::TokenCache<alloc::string::String>"),
            "TokenCache"
        );
    }
}
