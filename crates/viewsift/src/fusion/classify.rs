/*! Keyword classification of recognized text. */

use crate::types::ContentType;

pub const SEARCH_KEYWORDS: &[&str] = &["搜索", "search", "查找", "查询"];
pub const INPUT_KEYWORDS: &[&str] = &["输入", "input", "请输入", "请填写"];
pub const BUTTON_KEYWORDS: &[&str] = &[
  "确定", "取消", "确认", "提交", "登录", "注册", "返回", "关闭", "下一步", "完成", "删除", "编辑", "保存",
];
pub const LINK_KEYWORDS: &[&str] = &["了解更多", "查看详情", "点击查看", "点击进入"];

/// Tag a piece of text by the first keyword family it mentions.
///
/// Families are tried in order: search, input, button, link. Anything else is
/// plain [`ContentType::Text`].
pub fn classify_text(text: &str) -> ContentType {
  let lower = text.trim().to_lowercase();
  if contains_any(&lower, SEARCH_KEYWORDS) {
    ContentType::SearchInput
  } else if contains_any(&lower, INPUT_KEYWORDS) {
    ContentType::Input
  } else if contains_any(&lower, BUTTON_KEYWORDS) {
    ContentType::ButtonText
  } else if contains_any(&lower, LINK_KEYWORDS) {
    ContentType::LinkText
  } else {
    ContentType::Text
  }
}

/// Check whether `haystack` contains any of `needles`.
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|needle| haystack.contains(needle))
}
