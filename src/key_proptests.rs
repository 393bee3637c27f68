use super::*;
use proptest::prelude::*;

/// 区切り文字を含まない名前（コロンを除外）
fn valid_part_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ._'/-]{0,19}".prop_map(|s| s)
}

proptest! {
    /// format → parse でパッケージと名前が復元される
    #[test]
    fn prop_parse_inverts_display(
        package in valid_part_strategy(),
        name in valid_part_strategy()
    ) {
        let key = ResourceKey::new(package.clone(), name.clone()).unwrap();
        let parsed = ResourceKey::parse(&key.to_string()).unwrap();

        prop_assert_eq!(parsed.package(), Some(package.as_str()));
        prop_assert_eq!(parsed.name(), name.as_str());
    }

    /// 区切り文字が2つ以上あるキーは常に拒否される
    #[test]
    fn prop_parse_rejects_extra_separators(
        parts in prop::collection::vec(valid_part_strategy(), 3..6)
    ) {
        let input = parts.join(SEPARATOR);
        prop_assert!(ResourceKey::parse(&input).is_err());
    }

    /// パッケージキー部分は修飾キーのパッケージと一致する
    #[test]
    fn prop_package_part_matches_key_package(
        package in valid_part_strategy(),
        name in valid_part_strategy()
    ) {
        let key = ResourceKey::new(package.clone(), name).unwrap();
        let wire = key.to_string();
        prop_assert_eq!(package_part(&wire), package.as_str());
    }
}
