use log::LevelFilter;
use std::io::Write;

pub fn init_logger_exe() {
    let name = std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    init_logger(name);
}

/// Info for our own crates, warn for everything else. `RUST_LOG` wins.
pub fn init_logger(name: impl Into<String>) {
    let exe_name = name.into().replace('-', "_");

    env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter_module("easyocr", LevelFilter::Info)
        .filter_module("easyocr_core", LevelFilter::Info)
        .filter_module(&exe_name, LevelFilter::Info)
        .parse_default_env()
        .format(move |f, rec| {
            let now = humantime::format_rfc3339_millis(std::time::SystemTime::now());
            let module = rec.module_path().unwrap_or("<unknown>");
            let line = rec.line().unwrap_or(u32::MIN);
            let level = rec.level();

            writeln!(
                f,
                "[{} {} {} {}:{}] {}",
                level,
                exe_name,
                now,
                module,
                line,
                rec.args()
            )
        })
        .init();
}
