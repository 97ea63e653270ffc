use gridsnake::app::App;
use gridsnake::config::GridConfig;

fn main() -> crossterm::Result<()> {
    let mut app = App::new(GridConfig::default());
    app.run()
}
