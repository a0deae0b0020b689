use super::*;
use crate::types::{KeyStatus, PackStatus};
use tempfile::TempDir;

mod common {
    use super::*;

    pub(super) fn create_test_registry() -> (Registry, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::open(Config::new(temp_dir.path())).unwrap();
        (registry, temp_dir)
    }

    pub(super) fn new_pack(name: &str) -> NewPack {
        NewPack {
            name: name.to_string(),
            prefix: "STK".to_string(),
            key_len: 10,
            pack_size: 5,
            note: String::new(),
        }
    }

    pub(super) fn first_code(registry: &Registry, name: &str) -> String {
        registry.list_keys(name).unwrap()[0].key.to_string()
    }
}

mod open {
    use super::common::*;
    use super::*;

    #[test]
    fn creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("root");

        let registry = Registry::open(Config::new(&root)).unwrap();
        assert!(root.is_dir());
        assert!(registry.is_empty());
    }

    #[test]
    fn root_that_is_a_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file");
        fs::write(&root, "x").unwrap();

        let err = Registry::open(Config::new(&root)).err().unwrap();
        assert!(matches!(err, CdkeyError::RootDirUnavailable { .. }));
    }

    #[test]
    fn discovers_existing_packs() {
        let (registry, temp) = create_test_registry();
        registry.add_pack(&new_pack("p1")).unwrap();
        registry.add_pack(&new_pack("p2")).unwrap();
        registry.enable_pack("p2").unwrap();
        registry.stop_all();
        drop(registry);

        let registry = Registry::open(Config::new(temp.path())).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("p1"));

        let mut infos = registry.list_packs();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(infos[0].status, PackStatus::Initial);
        assert_eq!(infos[1].status, PackStatus::Ready);
    }

    #[test]
    fn skips_directories_that_are_not_packs() {
        let (registry, temp) = create_test_registry();
        registry.add_pack(&new_pack("good")).unwrap();
        registry.stop_all();
        drop(registry);

        fs::create_dir(temp.path().join("empty")).unwrap();
        let broken = temp.path().join("broken");
        fs::create_dir(&broken).unwrap();
        fs::write(layout::pack_info_path(&broken), "garbage").unwrap();
        fs::write(temp.path().join("stray.txt"), "x").unwrap();

        let registry = Registry::open(Config::new(temp.path())).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("good"));
    }

    #[test]
    fn explicit_dispatch() {
        let temp = TempDir::new().unwrap();
        let registry =
            Registry::open_with_dispatch(Config::new(temp.path()), Dispatch::none()).unwrap();
        registry.add_pack(&new_pack("quiet")).unwrap();
        assert!(registry.contains("quiet"));
    }
}

mod admin {
    use super::common::*;
    use super::*;

    #[test]
    fn add_rejects_duplicate_and_keeps_original() {
        let (registry, _temp) = create_test_registry();
        registry.add_pack(&new_pack("p1")).unwrap();
        let keys = registry.list_keys("p1").unwrap();

        let err = registry.add_pack(&new_pack("p1")).unwrap_err();
        assert!(matches!(err, CdkeyError::PackAlreadyExists { .. }));
        assert_eq!(registry.list_keys("p1").unwrap(), keys);
    }

    #[test]
    fn add_failure_registers_nothing() {
        let (registry, temp) = create_test_registry();
        let mut req = new_pack("bad_name");
        let err = registry.add_pack(&req).unwrap_err();
        assert!(matches!(err, CdkeyError::InvalidPackName { .. }));

        req.name = "short".to_string();
        req.key_len = 4;
        let err = registry.add_pack(&req).unwrap_err();
        assert!(matches!(err, CdkeyError::KeylenTooShort { .. }));

        assert!(registry.is_empty());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn remove_deletes_directory() {
        let (registry, temp) = create_test_registry();
        registry.add_pack(&new_pack("p1")).unwrap();

        registry.remove_pack("p1").unwrap();
        assert!(!temp.path().join("p1").exists());
        assert!(matches!(
            registry.list_keys("p1"),
            Err(CdkeyError::PackNotFound { .. })
        ));
        assert!(matches!(
            registry.remove_pack("p1"),
            Err(CdkeyError::PackNotFound { .. })
        ));
    }

    #[test]
    fn unknown_pack() {
        let (registry, _temp) = create_test_registry();
        for result in [
            registry.enable_pack("nope"),
            registry.disable_pack("nope", "x"),
            registry.use_key("nope", "STK"),
            registry.list_keys("nope").map(|_| ()),
        ] {
            assert!(matches!(result, Err(CdkeyError::PackNotFound { .. })));
        }
    }
}

mod keys {
    use super::common::*;
    use super::*;

    #[test]
    fn use_key_after_enable() {
        let (registry, _temp) = create_test_registry();
        registry.add_pack(&new_pack("p1")).unwrap();
        registry.enable_pack("p1").unwrap();
        let code = first_code(&registry, "p1");

        registry.use_key("p1", &code).unwrap();
        let record = registry
            .list_keys("p1")
            .unwrap()
            .into_iter()
            .find(|r| r.key.as_str() == code)
            .unwrap();
        assert_eq!(record.status, KeyStatus::Used);
    }

    #[test]
    fn stop_all_closes_packs() {
        let (registry, _temp) = create_test_registry();
        registry.add_pack(&new_pack("p1")).unwrap();
        registry.enable_pack("p1").unwrap();
        let code = first_code(&registry, "p1");

        registry.stop_all();
        assert!(matches!(
            registry.use_key("p1", &code),
            Err(CdkeyError::PackClosing)
        ));
        assert!(matches!(
            registry.list_keys("p1"),
            Err(CdkeyError::PackClosing)
        ));
        assert!(matches!(
            registry.enable_pack("p1"),
            Err(CdkeyError::PackClosing)
        ));
        assert!(matches!(
            registry.disable_pack("p1", "x"),
            Err(CdkeyError::PackClosing)
        ));
    }
}
