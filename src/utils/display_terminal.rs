//! 터미널 출력 포맷팅 유틸리티
//!
//! 서비스 레지스트리 초기화와 게이트웨이 기동 과정을 박스 제목, 진행 단계, 요약 형태로 출력합니다.

pub fn print_boxed_title(title: &str) {
    let content_width = 50;
    let border = "═".repeat(content_width);

    println!("╔{}╗", border);
    println!("║{:^49}║", title);
    println!("╚{}╝", border);
}

pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

pub fn print_final_summary(repos: usize, services: usize) {
    println!();
    print_boxed_title("🎉 SERVICE REGISTRY INITIALIZED");
    println!("   📦 Repositories: {}", repos);
    println!("   🔧 Services: {}", services);
    println!("   🚀 Total Components: {}", repos + services);
    println!();
}

pub fn print_cache_initialized(cache_type: &str, count: usize) {
    println!("   ├─ {} Cache: {} entries loaded", cache_type, count);
}

/// 인증 체인 구성 결과를 가중치 순서대로 출력합니다.
pub fn print_auth_chain(authers: &[(&str, i32)], checkers: &[(&str, i32)]) {
    print_boxed_title("🔐 OPENAPI AUTH CHAIN");
    for (name, weight) in authers {
        print_sub_task(name, &format!("auther, weight {}", weight));
    }
    for (name, weight) in checkers {
        print_sub_task(name, &format!("over-permission, weight {}", weight));
    }
    println!();
}
