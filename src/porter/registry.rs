//! ポーターレジストリ
//!
//! 型タグからポーターを検索する。完全一致の登録を優先し、なければ
//! 要求型に代入可能な（同一または祖先の）登録型のうち最も深いものを選ぶ。
//! 検索結果は要求型ごとにキャッシュし、登録のたびに破棄する。型宣言は
//! 共有階層の世代番号で検知し、古い世代のキャッシュは次の検索で破棄する。

use super::Porter;
use crate::error::{ModportError, Result};
use crate::types::{SharedHierarchy, TypeTag};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// 登録操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterResult {
    Added,
    /// 同じ基底型の既存ポーターを置き換えた
    Replaced,
}

/// 検索キャッシュ（型階層の世代ごと）
struct ResolveCache<P: ?Sized> {
    generation: u64,
    entries: HashMap<TypeTag, Arc<P>>,
}

/// ポーターレジストリ
pub struct PorterRegistry<P: ?Sized> {
    hierarchy: SharedHierarchy,
    porters: RwLock<HashMap<TypeTag, Arc<P>>>,
    resolved: RwLock<ResolveCache<P>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: ?Sized + Porter> PorterRegistry<P> {
    pub fn new(hierarchy: SharedHierarchy) -> Self {
        let generation = hierarchy.generation();
        Self {
            hierarchy,
            porters: RwLock::new(HashMap::new()),
            resolved: RwLock::new(ResolveCache {
                generation,
                entries: HashMap::new(),
            }),
        }
    }

    /// ポーターを基底型で登録
    pub fn register(&self, porter: Arc<P>) -> RegisterResult {
        let tag = porter.base_type().clone();
        let previous = write(&self.porters).insert(tag.clone(), porter);
        self.invalidate();
        debug!(base_type = %tag, "registered porter");

        if previous.is_some() {
            RegisterResult::Replaced
        } else {
            RegisterResult::Added
        }
    }

    /// 共有階層に型を宣言
    ///
    /// 同じ階層を共有する他のレジストリのキャッシュも次の検索で破棄される。
    pub fn declare_type(&self, tag: TypeTag, parent: Option<TypeTag>) -> Result<()> {
        self.hierarchy.declare(tag, parent)
    }

    fn invalidate(&self) {
        write(&self.resolved).entries.clear();
    }

    /// ポーターを検索（見つからない場合は `PorterNotFound`）
    pub fn resolve(&self, requested: &TypeTag) -> Result<Arc<P>> {
        self.try_resolve(requested)
            .ok_or_else(|| ModportError::PorterNotFound(requested.to_string()))
    }

    /// ポーターを検索
    pub fn try_resolve(&self, requested: &TypeTag) -> Option<Arc<P>> {
        let generation = self.hierarchy.generation();
        {
            let cache = read(&self.resolved);
            if cache.generation == generation {
                if let Some(cached) = cache.entries.get(requested) {
                    return Some(Arc::clone(cached));
                }
            }
        }

        let found = {
            let porters = read(&self.porters);
            match porters.get(requested) {
                Some(exact) => Some(Arc::clone(exact)),
                None => {
                    let hierarchy = self.hierarchy.read();
                    porters
                        .iter()
                        .filter(|(base, _)| hierarchy.is_assignable(base, requested))
                        .max_by(|(a, _), (b, _)| {
                            // 深さが同じ場合はタグ名で決定的に選ぶ
                            hierarchy
                                .depth(a)
                                .cmp(&hierarchy.depth(b))
                                .then_with(|| b.cmp(a))
                        })
                        .map(|(_, porter)| Arc::clone(porter))
                }
            }
        }?;

        let mut cache = write(&self.resolved);
        if cache.generation != generation {
            cache.entries.clear();
            cache.generation = generation;
        }
        cache.entries.insert(requested.clone(), Arc::clone(&found));
        Some(found)
    }

    /// 現在の型階層で検索結果がキャッシュされているか
    pub fn is_cached(&self, tag: &TypeTag) -> bool {
        let cache = read(&self.resolved);
        cache.generation == self.hierarchy.generation() && cache.entries.contains_key(tag)
    }

    /// 登録済みの基底型（ソート済み）
    pub fn registered_types(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = read(&self.porters).keys().cloned().collect();
        tags.sort();
        tags
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
