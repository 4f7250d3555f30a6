pub mod api;
pub mod core;
pub mod screen_scanner;

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("screen_scan"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // RUST_LOG overrides the default level
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .try_init();
    }
}
