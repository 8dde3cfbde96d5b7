use crate::data::Dataset;
use crate::error::Result;
use crate::pipeline::FilterParams;
use crate::tui::App;
use std::rc::Rc;

/// Run the view command - opens the dashboard in the TUI
pub fn run(dataset: Rc<Dataset>, params: FilterParams, top_n: usize) -> Result<()> {
    let mut app = App::new(dataset, params, top_n);
    app.run()?;
    Ok(())
}
