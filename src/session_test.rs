use super::*;
use crate::fs::mock::MockFs;
use crate::options::{OPTION_NAME, OPTION_PACKAGE_NAME};
use crate::package::PluginCandidate;
use crate::porter::AssetPorter;
use serde_json::json;
use std::sync::Mutex;

fn weapon() -> TypeTag {
    TypeTag::new("Weapon")
}

fn setup() -> (Arc<MockFs>, ModSession) {
    let fs = Arc::new(MockFs::new());
    let session = ModSession::new(ModsLayout::new("/app"), "meep", fs.clone());
    session.register_archetype_porter(Arc::new(AssetPorter::new(weapon(), "Weapons")));
    (fs, session)
}

fn keys(report: &ImportReport) -> Vec<String> {
    report
        .output
        .resources
        .iter()
        .map(|r| r.key().to_string())
        .collect()
}

fn add_published_sword(fs: &MockFs) {
    fs.add_file(
        "/app/mods/Acme/Weapons/Sword/_config.json",
        r#"{"name": "Sword"}"#,
    );
    fs.add_file("/app/mods/Acme/Weapons/Sword/sword.png", "png");
}

// ============================================================================
// import
// ============================================================================

#[test]
fn test_import_from_inbox_with_move_archives() {
    let (fs, mut session) = setup();
    fs.add_file(
        "/app/mods/__imports/Acme/Weapons/_config.json",
        r#"{"name": "Sword"}"#,
    );
    fs.add_file("/app/mods/__imports/Acme/Weapons/sword.png", "png");

    let options = ImportOptions::new().with(OPTION_MOVE_TO_FINISHED, true);
    let report = session.import_from_inbox(&weapon(), &options).unwrap();

    assert_eq!(keys(&report), vec!["Acme::Sword"]);
    assert!(report.archive.is_some());
    assert!(report.archive_failure().is_none());
    assert!(fs.exists(Path::new("/app/mods/Acme/Weapons/Sword/sword.png")));
    assert!(fs.exists(Path::new(
        "/app/mods/__processed_imports/Acme/Weapons/sword.png"
    )));
    assert!(!fs
        .file_paths()
        .iter()
        .any(|p| p.starts_with("/app/mods/__imports/")));
    assert_eq!(session.resources(&weapon(), "Acme::Sword").unwrap().len(), 1);
}

#[test]
fn test_import_from_inbox_loose_files_use_default_package() {
    let (fs, mut session) = setup();
    fs.add_file("/app/mods/__imports/Weapons/a.png", "a");
    fs.add_file("/app/mods/__imports/Weapons/b.png", "b");

    let report = session
        .import_from_inbox(&weapon(), &ImportOptions::new())
        .unwrap();

    assert_eq!(
        keys(&report),
        vec!["meep's Custom Assets::a", "meep's Custom Assets::b"]
    );
    assert!(report.archive.is_none());
    assert!(fs.exists(Path::new("/app/mods/__imports/Weapons/a.png")));
    assert_eq!(session.package("meep's Custom Assets").unwrap().len(), 2);
}

#[test]
fn test_import_with_explicit_options() {
    let (fs, mut session) = setup();
    fs.add_file("/drop/thing.png", "png");

    let options = ImportOptions::new()
        .with(OPTION_NAME, "Blade")
        .with(OPTION_PACKAGE_NAME, "Forge");
    let report = session
        .import(
            &weapon(),
            &[PathBuf::from("/drop/thing.png")],
            &options,
            true,
            None,
        )
        .unwrap();

    assert_eq!(keys(&report), vec!["Forge::Blade"]);
}

#[test]
fn test_import_unknown_kind_is_porter_not_found() {
    let (_fs, mut session) = setup();

    let err = session
        .import(&TypeTag::new("Sound"), &[], &ImportOptions::new(), true, None)
        .unwrap_err();

    assert!(matches!(err, ModportError::PorterNotFound(_)));
}

#[test]
fn test_import_subtype_uses_base_porter() {
    let (fs, mut session) = setup();
    session.declare_type(weapon(), None).unwrap();
    session
        .declare_type(TypeTag::new("Sword"), Some(weapon()))
        .unwrap();
    fs.add_file("/drop/excalibur.png", "png");

    session
        .import(
            &TypeTag::new("Sword"),
            &[PathBuf::from("/drop/excalibur.png")],
            &ImportOptions::new().with(OPTION_PACKAGE_NAME, "Acme"),
            true,
            None,
        )
        .unwrap();

    assert_eq!(
        session
            .resources(&TypeTag::new("Sword"), "Acme::excalibur")
            .unwrap()[0]
            .kind(),
        &TypeTag::new("Sword")
    );
    assert_eq!(
        session.resources(&weapon(), "Acme::excalibur").unwrap().len(),
        1
    );
}

#[test]
fn test_cancelled_import_skips_archive() {
    let (fs, mut session) = setup();
    fs.add_file("/app/mods/__imports/Acme/Weapons/a.png", "a");
    let token = CancellationToken::new();
    token.cancel();

    let report = session
        .import(
            &weapon(),
            &[PathBuf::from("/app/mods/__imports/Acme/Weapons/a.png")],
            &ImportOptions::new().with(OPTION_MOVE_TO_FINISHED, true),
            true,
            Some(&token),
        )
        .unwrap();

    assert!(report.output.cancelled);
    assert!(report.archive.is_none());
    assert!(fs.exists(Path::new("/app/mods/__imports/Acme/Weapons/a.png")));
}

// ============================================================================
// mods folder
// ============================================================================

#[test]
fn test_import_from_mods_folder_never_archives() {
    let (fs, mut session) = setup();
    add_published_sword(&fs);
    let before = fs.file_paths();

    let report = session
        .import_from_mods_folder(
            &weapon(),
            &ImportOptions::new().with(OPTION_MOVE_TO_FINISHED, true),
        )
        .unwrap();

    assert_eq!(keys(&report), vec!["Acme::Sword"]);
    assert!(report.archive.is_none());
    assert_eq!(fs.file_paths(), before);
}

#[test]
fn test_load_from_mod_folder() {
    let (fs, mut session) = setup();
    add_published_sword(&fs);
    let key = ResourceKey::new("Acme", "Sword").unwrap();

    let report = session
        .load_from_mod_folder(&weapon(), &key, &ImportOptions::new())
        .unwrap();

    assert_eq!(keys(&report), vec!["Acme::Sword"]);
}

#[test]
fn test_load_from_missing_mod_folder() {
    let (_fs, mut session) = setup();
    let key = ResourceKey::new("Acme", "Axe").unwrap();

    assert!(session
        .try_load_from_mod_folder(&weapon(), &key, &ImportOptions::new())
        .unwrap()
        .is_none());
    let err = session
        .load_from_mod_folder(&weapon(), &key, &ImportOptions::new())
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// lookup / unload
// ============================================================================

#[test]
fn test_lookup_missing_resource() {
    let (_fs, session) = setup();

    assert!(session.resources(&weapon(), "Acme::Sword").is_err());
    assert!(session
        .try_resources(&weapon(), "Acme::Sword")
        .unwrap()
        .is_empty());
    assert!(session.try_package("Acme").is_none());
}

#[test]
fn test_lookup_malformed_key() {
    let (_fs, session) = setup();

    let err = session.resources(&weapon(), "a::b::c").unwrap_err();

    assert!(matches!(err, ModportError::MalformedKey(_)));
}

#[test]
fn test_unload_removes_from_package() {
    let (fs, mut session) = setup();
    add_published_sword(&fs);
    let report = session
        .import_from_mods_folder(&weapon(), &ImportOptions::new())
        .unwrap();
    let sword = report.output.resources[0].clone();

    assert_eq!(session.unload(&sword), RemoveResult::Removed);
    assert!(session
        .try_resources(&weapon(), "Acme::Sword")
        .unwrap()
        .is_empty());
    assert!(session.resources_of_any_type("Acme::Sword").is_err());
}

#[test]
fn test_move_renamed_resource() {
    let (fs, mut session) = setup();
    add_published_sword(&fs);
    fs.add_file(
        "/app/mods/Acme/Weapons/OldSword/_config.json",
        r#"{"name": "OldSword"}"#,
    );
    fs.add_file("/app/mods/Acme/Weapons/OldSword/old.png", "old");
    let key = ResourceKey::new("Acme", "Sword").unwrap();
    let report = session
        .load_from_mod_folder(&weapon(), &key, &ImportOptions::new())
        .unwrap();
    let sword = &report.output.resources[0];

    assert!(!session
        .move_renamed_resource(&weapon(), "OldSword", sword, false)
        .unwrap());
    assert!(fs.exists(Path::new("/app/mods/Acme/Weapons/Sword/sword.png")));

    assert!(session
        .move_renamed_resource(&weapon(), "OldSword", sword, true)
        .unwrap());
    assert!(fs.exists(Path::new("/app/mods/Acme/Weapons/Sword/old.png")));
    assert!(!fs.exists(Path::new("/app/mods/Acme/Weapons/Sword/sword.png")));
}

// ============================================================================
// models
// ============================================================================

#[test]
fn test_save_and_load_model() {
    let (fs, session) = setup();
    let character = TypeTag::new("Character");
    session.register_model_porter(Arc::new(ModelPorter::new(
        character.clone(),
        "characters",
        "/app/data",
        fs.clone(),
    )));

    session
        .save_model(&character, &PortableModel::new("hero", "Hero", json!({"hp": 10})))
        .unwrap();

    let loaded = session.load_model(&character, "hero").unwrap();
    assert_eq!(loaded.data, json!({"hp": 10}));
    assert!(session
        .try_load_model(&character, "villain")
        .unwrap()
        .is_none());
}

// ============================================================================
// plugins
// ============================================================================

struct RecordingLoader {
    seen: Mutex<Vec<usize>>,
}

impl PluginLoader for RecordingLoader {
    fn load(&self, candidate: &PluginCandidate) -> Result<()> {
        self.seen.lock().unwrap().push(candidate.priority);
        if candidate.path.file_name_str() == "broken.dll" {
            return Err(ModportError::Plugin("bad image".to_string()));
        }
        Ok(())
    }
}

#[test]
fn test_discover_plugins_records_successes() {
    let (fs, mut session) = setup();
    fs.add_file("/app/mods/Acme/plugins/a.dll", "");
    fs.add_file("/app/mods/Acme/plugins/broken.dll", "");
    let loader = RecordingLoader {
        seen: Mutex::new(Vec::new()),
    };

    let report = session.discover_plugins(&loader).unwrap();

    assert_eq!(*loader.seen.lock().unwrap(), vec![0, 1]);
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        session.package("Acme").unwrap().plugins(),
        &[PathBuf::from("/app/mods/Acme/plugins/a.dll")]
    );
}
