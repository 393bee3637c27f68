use super::*;
use crate::options::{OPTION_NAME, OPTION_PACKAGE_NAME};

fn resolver() -> KeyResolver {
    KeyResolver::new(ModsLayout::new("/app"), "meep")
}

fn config(json: &str) -> ResourceConfig {
    ResourceConfig::parse(Path::new("/x/_config.json"), json).unwrap()
}

// === リソース名 ===

#[test]
fn test_option_name_wins_over_config() {
    let options = ImportOptions::new().with(OPTION_NAME, "FromOption");
    let cfg = config(r#"{"name":"FromConfig"}"#);

    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/Acme/Weapons/_config.json"),
            false,
            &options,
            Some(&cfg),
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.resource_name, "FromOption");
}

#[test]
fn test_config_name_is_used() {
    let cfg = config(r#"{"name":"Sword"}"#);
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/Acme/Weapons/_config.json"),
            false,
            &ImportOptions::new(),
            Some(&cfg),
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.resource_name, "Sword");
    assert_eq!(keys.package_name, "Acme");
    assert_eq!(keys.resource_key.to_string(), "Acme::Sword");
}

#[test]
fn test_loose_asset_uses_file_stem() {
    let keys = resolver()
        .resolve(
            Path::new("/tmp/drop/a.png"),
            false,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.resource_name, "a");
    assert_eq!(keys.package_name, "meep's Custom Assets");
}

#[test]
fn test_single_resource_folder_uses_relative_path() {
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/Acme/Weapons/Blades/Sword/sword.png"),
            true,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.folder_path, "Blades/Sword");
    assert_eq!(keys.resource_name, "Sword");
    assert_eq!(keys.resource_key.to_string(), "Acme::Sword");
}

#[test]
fn test_single_resource_folder_without_subfolder_falls_back_to_stem() {
    let keys = resolver()
        .resolve(
            Path::new("/tmp/drop/Sword/sword.png"),
            true,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.resource_name, "sword");
}

#[test]
fn test_config_directly_in_subfolder_is_reserved() {
    let err = resolver()
        .resolve(
            Path::new("/app/mods/Acme/Weapons/_config.json"),
            true,
            &ImportOptions::new(),
            Some(&ResourceConfig::default()),
            "Weapons",
        )
        .unwrap_err();

    assert!(matches!(err, ModportError::ReservedName(_)));
}

// === パッケージ名 ===

#[test]
fn test_option_package_wins() {
    let options = ImportOptions::new().with(OPTION_PACKAGE_NAME, "Override");
    let cfg = config(r#"{"packageName":"FromConfig"}"#);

    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/Acme/a.png"),
            false,
            &options,
            Some(&cfg),
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.package_name, "Override");
}

#[test]
fn test_config_package_is_used() {
    let cfg = config(r#"{"packageName":"FromConfig"}"#);
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/Acme/a.png"),
            false,
            &ImportOptions::new(),
            Some(&cfg),
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.package_name, "FromConfig");
}

#[test]
fn test_file_directly_in_inbox_uses_default_package() {
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/a.png"),
            false,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.package_name, "meep's Custom Assets");
}

#[test]
fn test_subfolder_directly_in_inbox_uses_default_package() {
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/__imports/Weapons/a.png"),
            false,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.package_name, "meep's Custom Assets");
}

#[test]
fn test_package_from_mods_folder_position() {
    let keys = resolver()
        .resolve(
            Path::new("/app/mods/Acme/Weapons/Sword/sword.png"),
            true,
            &ImportOptions::new(),
            None,
            "Weapons",
        )
        .unwrap();

    assert_eq!(keys.package_name, "Acme");
}

// === 不正なキー ===

#[test]
fn test_separator_in_name_is_malformed() {
    let options = ImportOptions::new().with(OPTION_NAME, "Sw::ord");
    let err = resolver()
        .resolve(
            Path::new("/tmp/a.png"),
            false,
            &options,
            None,
            "Weapons",
        )
        .unwrap_err();

    assert!(matches!(err, ModportError::MalformedKey(_)));
}

#[test]
fn test_separator_in_package_is_malformed() {
    let options = ImportOptions::new().with(OPTION_PACKAGE_NAME, "Ac::me");
    let err = resolver()
        .resolve(
            Path::new("/tmp/a.png"),
            false,
            &options,
            None,
            "Weapons",
        )
        .unwrap_err();

    assert!(matches!(err, ModportError::MalformedKey(_)));
}
