use dotenvy::dotenv;
use client::bootstrap;
use tracing::{error, info};
use common::utils::logging::init_logging_json;
use uuid::Uuid;

fn init_logging() {
    // 加载 .env（允许使用 RUST_LOG 配置日志级别）
    dotenv().ok();
    // 使用统一的JSON结构化日志初始化
    init_logging_json();
    info!(service = "test_client", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "test_client",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    // 读取线程配置（优先 config.toml，其次环境变量 CLIENT_WORKER_THREADS）
    let worker_threads = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.client.worker_threads,
        Err(e) => {
            error!(service = "test_client", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "test_client", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "test_client",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "test client starting"
    );

    // 仅作为启动入口，将执行流程委托给 crates/client
    if let Err(e) = rt.block_on(bootstrap::run()) {
        error!(service = "test_client", event = "run_failed", error = %e, "client::bootstrap::run returned error");
        return std::process::ExitCode::FAILURE;
    }

    info!(
        service = "test_client",
        event = "stop",
        %service_id,
        pid,
        "test client stopped"
    );
    std::process::ExitCode::SUCCESS
}
