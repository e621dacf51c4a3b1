//! 提交鉴权
//!
//! 当前为静态白名单，可替换为更完整的权限组件而不影响提交流程

use std::collections::HashSet;

/// 判断用户能否提交官方打卡点
#[cfg_attr(test, mockall::automock)]
pub trait SubmissionAuthorizer: Send + Sync {
    fn is_authorized(&self, user_id: &str) -> bool;
}

/// 基于白名单的鉴权
#[derive(Debug, Clone, Default)]
pub struct AllowListAuthorizer {
    allowed: HashSet<String>,
}

impl AllowListAuthorizer {
    pub fn new<I, S>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: user_ids
                .into_iter()
                .map(Into::into)
                .filter(|id: &String| !id.trim().is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl SubmissionAuthorizer for AllowListAuthorizer {
    fn is_authorized(&self, user_id: &str) -> bool {
        self.allowed.contains(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        let auth = AllowListAuthorizer::new(["hunter-1", "hunter-2", ""]);
        assert_eq!(auth.len(), 2);
        assert!(auth.is_authorized("hunter-1"));
        assert!(!auth.is_authorized("hunter-3"));
        assert!(!auth.is_authorized(""));
    }

    #[test]
    fn test_empty_list_denies_everyone() {
        let auth = AllowListAuthorizer::default();
        assert!(auth.is_empty());
        assert!(!auth.is_authorized("anyone"));
    }
}
