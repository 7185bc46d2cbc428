use crate::app::App;
use crate::render;
use organbank_core::availability::AvailabilityBoard;

/// Show the availability board, optionally narrowed by `search`.
///
/// With `submit`, a search that has hits is announced on the bus.
pub async fn run(app: &App, search: Option<String>, submit: bool) -> anyhow::Result<()> {
    app.registry.initialize().await;
    let board = AvailabilityBoard::load(app.gateway.as_ref(), &app.registry.snapshot()).await;

    let term = search.unwrap_or_default();
    let hits = board.search(&term);
    print!("{}", render::availability(&hits, board.loaded_at()));

    if submit {
        if board.submit(&app.bus, &term) {
            println!("Availability data submitted for {term:?}.");
        } else {
            anyhow::bail!("nothing to submit: give a --search term that matches at least one organ");
        }
    }
    Ok(())
}
