fn main() -> Result<(), pillar_preview::AppError> {
    // Set up logging; RUST_LOG=debug shows scheduler decisions
    env_logger::init();

    pillar_preview::run_app()
}
