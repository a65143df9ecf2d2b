fn main() {
    env_logger::init();
    log::info!("swarmfx starting up");

    if let Err(e) = swarmfx::app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
