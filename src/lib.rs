pub mod config;
pub mod error;
pub mod io_struct;
pub mod logging;
pub mod model;
pub mod predict_state;
pub mod schema;
pub mod server;

use config::ServiceConfig;
use predict_state::PredictState;
use server::startup;

/// Load the model and serve until the process is interrupted.
pub fn run(config: ServiceConfig) -> anyhow::Result<()> {
    config.validate()?;
    let predict_state = PredictState::load(&config);

    actix_web::rt::System::new().block_on(startup(config, predict_state))?;
    log::info!("Server stopped");
    Ok(())
}
