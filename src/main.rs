mod gui;

use iced::{window, Size};

fn main() -> iced::Result {
    if let Err(e) = sumcheck::logging::init_logging() {
        eprintln!("{e:#}");
    }

    iced::application(
        "Checksum Verifier",
        gui::SumcheckApp::update,
        gui::SumcheckApp::view,
    )
    .window(window::Settings {
        size: Size::new(640.0, 300.0),
        resizable: false,
        ..window::Settings::default()
    })
    .run_with(gui::SumcheckApp::new)
}
