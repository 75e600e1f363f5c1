//! Localized user-facing strings.
//!
//! The active `Language` is always passed in explicitly. Hosts re-resolve it
//! from their locale whenever that changes and hand the new value to the next
//! call; nothing here caches a current language.

use serde::{Deserialize, Serialize};

use crate::core::ROOT_FOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    /// Resolves a locale tag such as `zh-cn` or `en_US`.
    ///
    /// Tries the full tag first, then its primary subtag, then falls back to English.
    pub fn from_locale(locale: &str) -> Self {
        let normalized = locale.trim().to_ascii_lowercase().replace('_', "-");
        Self::from_tag(&normalized)
            .or_else(|| {
                normalized
                    .split('-')
                    .next()
                    .and_then(Self::from_tag)
            })
            .unwrap_or_default()
    }
}

/// Every string the find-and-replace feature shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    ModalTitle,
    FolderSettingName,
    FolderSettingDesc,
    FindSettingName,
    FindSettingPlaceholder,
    ReplaceSettingName,
    ReplaceSettingPlaceholder,
    CaseSensitiveName,
    CaseSensitiveDesc,
    UseRegexName,
    UseRegexDesc,
    SubmitButtonText,
    ErrorFindInputEmpty,
    InfoStarting,
    /// Takes `{error}`.
    ErrorInvalidRegex,
    /// Takes `{folder}`.
    InfoNoFilesFound,
    /// Takes `{count}` and `{folder}`.
    SuccessResults,
    /// Takes `{count}` and `{folder}`.
    InfoCancelled,
    ErrorUnknown,
    EntireVault,
}

fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        ModalTitle => "Batch Find and Replace",
        FolderSettingName => "Select Folder",
        FolderSettingDesc => "Choose the target folder for the operation.",
        FindSettingName => "Find",
        FindSettingPlaceholder => "Enter text to find...",
        ReplaceSettingName => "Replace with",
        ReplaceSettingPlaceholder => "Enter text to replace...",
        CaseSensitiveName => "Case sensitive",
        CaseSensitiveDesc => {
            "If enabled, \"Apple\" and \"apple\" will be treated as different words."
        }
        UseRegexName => "Use regular expression",
        UseRegexDesc => "If enabled, the find input will be treated as a regular expression.",
        SubmitButtonText => "Execute Replace",
        ErrorFindInputEmpty => "Find input cannot be empty!",
        InfoStarting => "Starting batch replacement...",
        ErrorInvalidRegex => "Invalid regular expression: {error}",
        InfoNoFilesFound => "No Markdown files found in folder \"{folder}\".",
        SuccessResults => "Operation complete! {count} files were modified in {folder}.",
        InfoCancelled => "Replacement cancelled. {count} files were modified in {folder}.",
        ErrorUnknown => "An unknown error occurred during replacement.",
        EntireVault => "the entire vault",
    }
}

fn chinese(key: MessageKey) -> Option<&'static str> {
    use MessageKey::*;
    let text = match key {
        ModalTitle => "批量查找和替换",
        FolderSettingName => "选择文件夹",
        FolderSettingDesc => "选择要进行操作的目标文件夹。",
        FindSettingName => "查找内容",
        FindSettingPlaceholder => "输入要查找的文本...",
        ReplaceSettingName => "替换为",
        ReplaceSettingPlaceholder => "输入要替换的文本...",
        CaseSensitiveName => "区分大小写",
        CaseSensitiveDesc => "开启后，\"Apple\" 和 \"apple\" 将被视为不同的词。",
        UseRegexName => "使用正则表达式",
        UseRegexDesc => "开启后，查找内容将被作为正则表达式进行匹配。",
        SubmitButtonText => "执行替换",
        ErrorFindInputEmpty => "查找内容不能为空！",
        InfoStarting => "正在开始批量替换...",
        ErrorInvalidRegex => "无效的正则表达式: {error}",
        InfoNoFilesFound => "在文件夹 \"{folder}\" 中未找到任何 Markdown 文件。",
        SuccessResults => "操作完成！在 {folder} 中，共修改了 {count} 个文件。",
        EntireVault => "整个仓库",
        InfoCancelled | ErrorUnknown => return None,
    };
    Some(text)
}

/// Looks up a message, falling back to English when the language lacks it.
pub fn text(lang: Language, key: MessageKey) -> &'static str {
    let translated = match lang {
        Language::En => None,
        Language::Zh => chinese(key),
    };
    translated.unwrap_or_else(|| english(key))
}

/// Looks up a message and fills in its `{name}` placeholders.
pub fn format_message(lang: Language, key: MessageKey, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(text(lang, key).to_string(), |message, (name, value)| {
            message.replace(&format!("{{{name}}}"), value)
        })
}

/// How a folder scope is named in messages.
pub fn scope_display_name(lang: Language, folder: &str) -> String {
    if folder == ROOT_FOLDER {
        text(lang, MessageKey::EntireVault).to_string()
    } else {
        folder.to_string()
    }
}

pub fn invalid_regex(lang: Language, error: &str) -> String {
    format_message(lang, MessageKey::ErrorInvalidRegex, &[("error", error)])
}

pub fn no_files_found(lang: Language, folder: &str) -> String {
    let folder = scope_display_name(lang, folder);
    format_message(lang, MessageKey::InfoNoFilesFound, &[("folder", &folder)])
}

pub fn success_results(lang: Language, count: usize, folder: &str) -> String {
    let folder = scope_display_name(lang, folder);
    format_message(
        lang,
        MessageKey::SuccessResults,
        &[("count", &count.to_string()), ("folder", &folder)],
    )
}

pub fn cancelled_results(lang: Language, count: usize, folder: &str) -> String {
    let folder = scope_display_name(lang, folder);
    format_message(
        lang,
        MessageKey::InfoCancelled,
        &[("count", &count.to_string()), ("folder", &folder)],
    )
}

/// The labels of the find-and-replace form, ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLabels {
    pub title: &'static str,
    pub folder_name: &'static str,
    pub folder_desc: &'static str,
    pub find_name: &'static str,
    pub find_placeholder: &'static str,
    pub replace_name: &'static str,
    pub replace_placeholder: &'static str,
    pub case_sensitive_name: &'static str,
    pub case_sensitive_desc: &'static str,
    pub use_regex_name: &'static str,
    pub use_regex_desc: &'static str,
    pub submit: &'static str,
}

impl FormLabels {
    pub fn for_language(lang: Language) -> Self {
        use MessageKey::*;
        Self {
            title: text(lang, ModalTitle),
            folder_name: text(lang, FolderSettingName),
            folder_desc: text(lang, FolderSettingDesc),
            find_name: text(lang, FindSettingName),
            find_placeholder: text(lang, FindSettingPlaceholder),
            replace_name: text(lang, ReplaceSettingName),
            replace_placeholder: text(lang, ReplaceSettingPlaceholder),
            case_sensitive_name: text(lang, CaseSensitiveName),
            case_sensitive_desc: text(lang, CaseSensitiveDesc),
            use_regex_name: text(lang, UseRegexName),
            use_regex_desc: text(lang, UseRegexDesc),
            submit: text(lang, SubmitButtonText),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_locale_resolution() {
        assert_eq!(Language::from_locale("en"), Language::En);
        assert_eq!(Language::from_locale("zh"), Language::Zh);
        assert_eq!(Language::from_locale("zh-cn"), Language::Zh);
        assert_eq!(Language::from_locale("zh_TW"), Language::Zh);
        assert_eq!(Language::from_locale("fr"), Language::En);
        assert_eq!(Language::from_locale(""), Language::En);
    }

    #[test]
    fn test_success_message_names_the_scope() {
        assert_snapshot!(
            success_results(Language::En, 3, ROOT_FOLDER),
            @"Operation complete! 3 files were modified in the entire vault."
        );
        assert_snapshot!(
            success_results(Language::En, 0, "Journal/2024"),
            @"Operation complete! 0 files were modified in Journal/2024."
        );
        assert_snapshot!(
            success_results(Language::Zh, 2, ROOT_FOLDER),
            @"操作完成！在 整个仓库 中，共修改了 2 个文件。"
        );
    }

    #[test]
    fn test_parameterized_errors() {
        assert_snapshot!(
            invalid_regex(Language::En, "unclosed group"),
            @"Invalid regular expression: unclosed group"
        );
        assert_snapshot!(
            no_files_found(Language::Zh, "Notes"),
            @r#"在文件夹 "Notes" 中未找到任何 Markdown 文件。"#
        );
    }

    #[test]
    fn test_missing_translation_falls_back_to_english() {
        assert_eq!(
            text(Language::Zh, MessageKey::ErrorUnknown),
            text(Language::En, MessageKey::ErrorUnknown)
        );
        assert!(cancelled_results(Language::Zh, 1, "A").starts_with("Replacement cancelled."));
    }

    #[test]
    fn test_form_labels_follow_language() {
        assert_eq!(FormLabels::for_language(Language::En).submit, "Execute Replace");
        assert_eq!(FormLabels::for_language(Language::Zh).submit, "执行替换");
    }
}
