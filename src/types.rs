//! 型タグと型階層
//!
//! ポーターの検索に使用する継承関係を明示的なテーブルで保持する。
//! 型は登録時に `declare(tag, parent)` で宣言し、循環や親の付け替えは拒否する。

use crate::error::{ModportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// 型タグ
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 型階層テーブル
///
/// 宣言されていないタグは親を持たないルート型として扱う。
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    parents: HashMap<TypeTag, Option<TypeTag>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 型を宣言
    ///
    /// - 同じ親での再宣言は何もしない
    /// - 異なる親での再宣言・自己参照・循環は `InvalidType`
    pub fn declare(&mut self, tag: TypeTag, parent: Option<TypeTag>) -> Result<()> {
        if let Some(existing) = self.parents.get(&tag) {
            if *existing == parent {
                return Ok(());
            }
            return Err(ModportError::InvalidType(format!(
                "{} is already declared with parent {}",
                tag,
                existing.as_ref().map(TypeTag::as_str).unwrap_or("<none>")
            )));
        }

        if let Some(parent) = &parent {
            if *parent == tag || self.ancestors(parent).contains(&tag) {
                return Err(ModportError::InvalidType(format!(
                    "declaring {} under {} would create a cycle",
                    tag, parent
                )));
            }
        }

        self.parents.insert(tag, parent);
        Ok(())
    }

    /// 直接の親
    pub fn parent(&self, tag: &TypeTag) -> Option<&TypeTag> {
        self.parents.get(tag).and_then(Option::as_ref)
    }

    /// 祖先を近い順に列挙（自身は含まない）
    pub fn ancestors(&self, tag: &TypeTag) -> Vec<TypeTag> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(tag);
        while let Some(parent) = current {
            ancestors.push(parent.clone());
            current = self.parent(parent);
        }
        ancestors
    }

    /// 継承の深さ（ルート型は 0）
    pub fn depth(&self, tag: &TypeTag) -> usize {
        self.ancestors(tag).len()
    }

    /// `base` 用のポーターが `requested` を扱えるか
    pub fn is_assignable(&self, base: &TypeTag, requested: &TypeTag) -> bool {
        base == requested || self.ancestors(requested).contains(base)
    }
}

/// レジストリ間で共有する型階層
///
/// 宣言のたびに世代番号が進む。各レジストリは検索キャッシュに世代を記録し、
/// 一致しなければ破棄するので、どのレジストリ経由で宣言しても全体に反映される。
#[derive(Debug, Clone, Default)]
pub struct SharedHierarchy(Arc<HierarchyCell>);

#[derive(Debug, Default)]
struct HierarchyCell {
    table: RwLock<TypeHierarchy>,
    generation: AtomicU64,
}

impl SharedHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み取りロック（poison されていても継続）
    pub fn read(&self) -> RwLockReadGuard<'_, TypeHierarchy> {
        self.0
            .table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 型を宣言し、世代を進める
    pub fn declare(&self, tag: TypeTag, parent: Option<TypeTag>) -> Result<()> {
        self.0
            .table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .declare(tag, parent)?;
        self.0.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// 現在の世代
    pub fn generation(&self) -> u64 {
        self.0.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weapon_hierarchy() -> TypeHierarchy {
        let mut h = TypeHierarchy::new();
        h.declare("Item".into(), None).unwrap();
        h.declare("Weapon".into(), Some("Item".into())).unwrap();
        h.declare("Sword".into(), Some("Weapon".into())).unwrap();
        h
    }

    #[test]
    fn test_depth_counts_ancestors() {
        let h = weapon_hierarchy();
        assert_eq!(h.depth(&"Item".into()), 0);
        assert_eq!(h.depth(&"Sword".into()), 2);
        assert_eq!(h.depth(&"Unknown".into()), 0);
    }

    #[test]
    fn test_is_assignable() {
        let h = weapon_hierarchy();
        assert!(h.is_assignable(&"Item".into(), &"Sword".into()));
        assert!(h.is_assignable(&"Sword".into(), &"Sword".into()));
        assert!(!h.is_assignable(&"Sword".into(), &"Item".into()));
    }

    #[test]
    fn test_redeclare_with_same_parent_is_noop() {
        let mut h = weapon_hierarchy();
        h.declare("Sword".into(), Some("Weapon".into())).unwrap();
        assert_eq!(h.parent(&"Sword".into()), Some(&TypeTag::new("Weapon")));
    }

    #[test]
    fn test_redeclare_with_different_parent_fails() {
        let mut h = weapon_hierarchy();
        let err = h.declare("Sword".into(), Some("Item".into())).unwrap_err();
        assert!(matches!(err, ModportError::InvalidType(_)));
    }

    #[test]
    fn test_shared_declare_advances_generation_for_all_clones() {
        let shared = SharedHierarchy::new();
        let other = shared.clone();
        let before = other.generation();

        shared.declare("Weapon".into(), None).unwrap();

        assert!(other.generation() > before);
        assert_eq!(other.read().depth(&"Weapon".into()), 0);
        assert!(shared
            .declare("Weapon".into(), Some("Weapon".into()))
            .is_err());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut h = TypeHierarchy::new();
        h.declare("B".into(), Some("A".into())).unwrap();
        assert!(h.declare("A".into(), Some("B".into())).is_err());
        assert!(h.declare("C".into(), Some("C".into())).is_err());
    }
}
