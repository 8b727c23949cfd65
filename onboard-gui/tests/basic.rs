#[test]
fn gui_config_defaults() {
    let config = onboard_gui::GuiConfig::default();
    assert_eq!(config.title, "Setup Wizard");
    assert_eq!(config.width, 960.0);
    assert_eq!(config.height, 640.0);
}
