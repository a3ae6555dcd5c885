//! # Registry 模块
//!
//! 存活弹窗的保持集合。
//!
//! 弹窗在展示期间由注册表强持有，调用方丢掉自己的句柄也不会被释放；
//! 只有确认关闭完成后才移除。注册表由应用注入，不是全局状态。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::controller::{PopController, PopId};

/// 弹窗注册表
///
/// 廉价克隆的句柄，克隆共享同一集合。
#[derive(Clone, Default)]
pub struct PopRegistry {
    entries: Rc<RefCell<BTreeMap<PopId, PopController>>>,
    next_id: Rc<Cell<u64>>,
}

impl std::fmt::Debug for PopRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.borrow().keys()).finish()
    }
}

impl PopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配下一个弹窗 ID，从 1 开始
    pub(crate) fn allocate_id(&self) -> PopId {
        let raw = self.next_id.get() + 1;
        self.next_id.set(raw);
        PopId::new(raw)
    }

    /// 注册弹窗，已存在时返回 `false`
    pub fn register(&self, controller: &PopController) -> bool {
        let id = controller.id();
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(id, controller.clone());
        debug!(%id, total = entries.len(), "registry: register");
        true
    }

    /// 移除弹窗，不存在时返回 `false`
    pub fn unregister(&self, id: PopId) -> bool {
        // 先取出再释放借用，弹窗析构时可能再次访问注册表
        let removed = self.entries.borrow_mut().remove(&id);
        let existed = removed.is_some();
        if existed {
            debug!(%id, "registry: unregister");
        }
        drop(removed);
        existed
    }

    pub fn contains(&self, id: PopId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
