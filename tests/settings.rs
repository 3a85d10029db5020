use gdi_drawer::drawer::Color;
use gdi_drawer::settings::DrawerSettings;
use tempfile::tempdir;

#[test]
fn save_then_load_keeps_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drawer.json");
    let settings = DrawerSettings {
        width: 320,
        height: 240,
        scale: 4,
        continuous_update: false,
        background: Color::NAVY,
        title: "Sketch".to_string(),
        ..DrawerSettings::default()
    };
    settings.save(&path).unwrap();
    assert_eq!(DrawerSettings::load(&path).unwrap(), settings);
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let loaded = DrawerSettings::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(loaded, DrawerSettings::default());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drawer.json");
    std::fs::write(&path, r#"{ "scale": 20 }"#).unwrap();
    let loaded = DrawerSettings::load(&path).unwrap();
    assert_eq!(loaded.scale, 20);
    assert_eq!(loaded.width, 800);
    assert!(loaded.continuous_update);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drawer.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(DrawerSettings::load(&path).is_err());
}

#[test]
fn unreadable_path_is_an_error_not_defaults() {
    let dir = tempdir().unwrap();
    let err = DrawerSettings::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("failed to read"), "{err}");
}

#[test]
fn non_utf8_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drawer.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
    assert!(DrawerSettings::load(&path).is_err());
}
